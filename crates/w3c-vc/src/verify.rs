//! # Verification
//!
//! Verifying a signed credential checks, in order:
//!
//! 1. the token parses;
//! 2. the payload names an issuer;
//! 3. the header `kid` is under the issuer's DID;
//! 4. the issuer's controller document authorizes `kid` for assertions;
//! 5. the signature verifies;
//! 6. any `iat`/`nbf`/`exp` window holds;
//! 7. optionally, the payload conforms to each of its `credentialSchema`s.
//!
//! The first failure is returned; nothing is partially verified.

use attest_core::Quota;
use attest_did::{ControllerResolver, DidClient};
use attest_infosec::Jws;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{CredentialSchema, VerifiableCredential, VerifiablePresentation};
use crate::schema::SchemaResolver;
use crate::{Error, Result};

/// Options for [`Verifier::verify`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyOptions {
    /// Validate the payload against its `credentialSchema` entries.
    pub validate_schema: bool,
}

/// A verified presentation and the payloads of its verified credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedPresentation {
    /// The presentation.
    pub presentation: VerifiablePresentation,

    /// Verified credential payloads, in presentation order.
    pub credentials: Vec<Value>,
}

/// Whether `issuer` controls the key `kid`: `kid` is the issuer DID followed
/// by nothing or a `#fragment`.
///
/// `did:web:a.com` owns `did:web:a.com#key-1` but not
/// `did:web:a.com.evil.org#key-1`.
#[must_use]
pub fn issuer_owns_key(issuer: &str, kid: &str) -> bool {
    if issuer.is_empty() {
        return false;
    }
    kid.strip_prefix(issuer).is_some_and(|rest| rest.is_empty() || rest.starts_with('#'))
}

/// Check the `nbf` and `exp` claims against `now` (seconds since the epoch).
/// Absent claims pass.
///
/// # Errors
///
/// Returns [`Error::Expired`] if `exp <= now`, [`Error::NotYetValid`] if
/// `nbf > now` and [`Error::MalformedInput`] if either claim is not a number.
#[allow(clippy::cast_possible_truncation)]
pub fn check_validity(payload: &Value, now: i64) -> Result<()> {
    let claim = |name: &str| -> Result<Option<i64>> {
        match payload.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| Error::MalformedInput(format!("'{name}' is not a number"))),
        }
    };

    if let Some(exp) = claim("exp")? {
        if exp <= now {
            return Err(Error::Expired(format!("expired at {exp}")));
        }
    }
    if let Some(nbf) = claim("nbf")? {
        if nbf > now {
            return Err(Error::NotYetValid(format!("not valid before {nbf}")));
        }
    }
    Ok(())
}

/// Verifies signed credentials and presentations. Clones share the
/// controller and schema stores.
#[derive(Clone, Debug)]
pub struct Verifier<C> {
    controllers: ControllerResolver<C>,
    schemas: SchemaResolver,
}

impl<C: DidClient> Verifier<C> {
    /// Create a verifier over the given stores.
    pub const fn new(controllers: ControllerResolver<C>, schemas: SchemaResolver) -> Self {
        Self { controllers, schemas }
    }

    /// The controller store.
    pub const fn controllers(&self) -> &ControllerResolver<C> {
        &self.controllers
    }

    /// The schema store.
    pub const fn schemas(&self) -> &SchemaResolver {
        &self.schemas
    }

    /// Verify a signed credential, returning its payload.
    ///
    /// # Errors
    ///
    /// Returns the first failing check; see the module documentation.
    pub async fn verify(&self, token: &str, options: &VerifyOptions) -> Result<Value> {
        let jws = Jws::parse(token)?;
        let kid = &jws.header.kid;

        let issuer = match jws.payload.get("issuer") {
            Some(Value::String(id)) => id.as_str(),
            Some(Value::Object(issuer)) => issuer
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            _ => "",
        };
        if issuer.is_empty() {
            return Err(Error::MissingIssuer("payload has no issuer".into()));
        }
        if !issuer_owns_key(issuer, kid) {
            tracing::warn!(issuer, kid, "key is not controlled by issuer");
            return Err(Error::IssuerKeyMismatch {
                issuer: issuer.to_string(),
                kid: kid.clone(),
            });
        }

        let controller = self.controllers.resolve_controller(kid).await?;
        let payload = controller.assertion.resolve(kid)?.verify(token)?;
        check_validity(&payload, Utc::now().timestamp())?;

        if options.validate_schema {
            self.validate_schemas(&payload)?;
        }

        tracing::debug!(issuer, kid, "credential verified");
        Ok(payload)
    }

    /// Verify a signed credential, returning it as a [`VerifiableCredential`].
    ///
    /// # Errors
    ///
    /// As [`Verifier::verify`], plus [`Error::InvalidCredential`] if the
    /// payload is not a credential.
    pub async fn verify_credential(
        &self, token: &str, options: &VerifyOptions,
    ) -> Result<VerifiableCredential> {
        let payload = self.verify(token, options).await?;
        serde_json::from_value(payload)
            .map_err(|e| Error::InvalidCredential(format!("issue deserializing credential: {e}")))
    }

    /// Verify a signed presentation and every credential it carries.
    ///
    /// The presentation must be signed with one of the holder's
    /// authentication keys and be within its validity window.
    ///
    /// # Errors
    ///
    /// Returns the first failing check on the presentation or any of its
    /// credentials.
    pub async fn verify_presentation(
        &self, token: &str, options: &VerifyOptions,
    ) -> Result<VerifiedPresentation> {
        let jws = Jws::parse(token)?;
        let kid = &jws.header.kid;

        let holder = jws.payload.get("holder").and_then(Value::as_str).unwrap_or_default();
        if holder.is_empty() {
            return Err(Error::MissingIssuer("presentation has no holder".into()));
        }
        if !issuer_owns_key(holder, kid) {
            tracing::warn!(holder, kid, "key is not controlled by holder");
            return Err(Error::IssuerKeyMismatch {
                issuer: holder.to_string(),
                kid: kid.clone(),
            });
        }

        let controller = self.controllers.resolve_controller(kid).await?;
        let payload = controller.authentication.resolve(kid)?.verify(token)?;
        check_validity(&payload, Utc::now().timestamp())?;

        let presentation: VerifiablePresentation = serde_json::from_value(payload)
            .map_err(|e| Error::MalformedInput(format!("issue deserializing presentation: {e}")))?;

        let mut credentials = Vec::with_capacity(presentation.verifiable_credential.len());
        for envelope in &presentation.verifiable_credential {
            credentials.push(self.verify(envelope.token()?, options).await?);
        }

        tracing::debug!(holder, kid, credentials = credentials.len(), "presentation verified");
        Ok(VerifiedPresentation {
            presentation,
            credentials,
        })
    }

    fn validate_schemas(&self, payload: &Value) -> Result<()> {
        let Some(schemas) = payload.get("credentialSchema") else {
            return Ok(());
        };
        let schemas: Quota<CredentialSchema> = serde_json::from_value(schemas.clone())
            .map_err(|e| Error::MalformedInput(format!("issue reading credentialSchema: {e}")))?;

        let mut errors = Vec::new();
        for schema in &schemas {
            errors.extend(self.schemas.validate(&schema.id, payload)?);
        }
        if !errors.is_empty() {
            return Err(Error::SchemaValidation(errors));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("did:web:a.com", "did:web:a.com#key-1", true)]
    #[case("did:web:a.com", "did:web:a.com", true)]
    #[case("did:web:a.com", "did:web:b.com#key-1", false)]
    #[case("did:web:a.com", "did:web:a.com.evil.org#key-1", false)]
    #[case("did:web:a.com", "did:web:a.com:user#key-1", false)]
    #[case("", "did:web:a.com#key-1", false)]
    fn owns_key(#[case] issuer: &str, #[case] kid: &str, #[case] owned: bool) {
        assert_eq!(issuer_owns_key(issuer, kid), owned);
    }

    #[test]
    fn validity_window() {
        let now = 1_700_000_000;

        check_validity(&json!({}), now).expect("absent claims pass");
        check_validity(&json!({"exp": now + 3600, "nbf": now}), now).expect("should be valid");

        let err = check_validity(&json!({"exp": now - 1}), now).expect_err("should be expired");
        assert!(matches!(err, Error::Expired(_)));
        let err = check_validity(&json!({"exp": now}), now).expect_err("should be expired");
        assert!(matches!(err, Error::Expired(_)));

        let err =
            check_validity(&json!({"nbf": now + 60}), now).expect_err("should not be valid yet");
        assert!(matches!(err, Error::NotYetValid(_)));

        let err =
            check_validity(&json!({"exp": "tomorrow"}), now).expect_err("should be malformed");
        assert!(matches!(err, Error::MalformedInput(_)));
    }
}
