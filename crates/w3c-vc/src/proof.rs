//! # Securing Credentials
//!
//! Credentials and presentations are secured with an enveloping proof: the
//! JSON object is the payload of a compact JWS ([Securing Verifiable
//! Credentials using JOSE and COSE]).
//!
//! Only the registered claims a caller asks for (`iat`, `nbf`, `exp`) are
//! added to the payload.
//!
//! [Securing Verifiable Credentials using JOSE and COSE]: https://w3c.github.io/vc-jose-cose

use attest_infosec::jose::jws;
use attest_infosec::{KeySigner, PrivateKeyJwk, Signer};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{VerifiableCredential, VerifiablePresentation};
use crate::verify::issuer_owns_key;
use crate::{Error, Result};

/// `typ` header for signed credentials.
pub const CREDENTIAL_TYP: &str = "vc+jwt";

/// `typ` header for signed presentations.
pub const PRESENTATION_TYP: &str = "vp+jwt";

/// Options for [`sign`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SignOptions {
    /// Key identifier placed in the header, e.g. `did:web:example.com#key-1`.
    pub kid: String,

    /// Issued-at, in seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, in seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not-before, in seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Sign an arbitrary JSON object with `key`.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if `payload` is not an object or
/// `options.kid` is empty, and [`Error::InvalidKey`] if the key is unusable.
pub async fn sign(key: &PrivateKeyJwk, payload: &Value, options: &SignOptions) -> Result<String> {
    let Value::Object(claims) = payload else {
        return Err(Error::MalformedInput("payload must be a JSON object".into()));
    };
    let mut claims = claims.clone();
    insert_claims(&mut claims, options.iat, options.nbf, options.exp);

    let signer = KeySigner::new(key.clone(), &options.kid)?;
    Ok(jws::encode(None, &claims, &signer).await?)
}

/// Sign a credential. The signer's key must belong to the credential's
/// issuer.
///
/// # Errors
///
/// Returns [`Error::IssuerKeyMismatch`] if the signer's key is not under the
/// issuer's DID.
pub async fn sign_credential(vc: &VerifiableCredential, signer: &impl Signer) -> Result<String> {
    let kid = signer.verification_method();
    if !issuer_owns_key(vc.issuer_id(), &kid) {
        return Err(Error::IssuerKeyMismatch {
            issuer: vc.issuer_id().to_string(),
            kid,
        });
    }
    tracing::debug!(issuer = vc.issuer_id(), "signing credential");
    Ok(jws::encode(Some(CREDENTIAL_TYP), vc, signer).await?)
}

/// Sign a presentation, valid from now for `ttl` (one hour if `None`). The
/// signer's key must belong to the holder.
///
/// # Errors
///
/// Returns [`Error::IssuerKeyMismatch`] if the signer's key is not under the
/// holder's DID.
pub async fn sign_presentation(
    vp: &VerifiablePresentation, signer: &impl Signer, ttl: Option<TimeDelta>,
) -> Result<String> {
    let kid = signer.verification_method();
    if !issuer_owns_key(&vp.holder, &kid) {
        return Err(Error::IssuerKeyMismatch {
            issuer: vp.holder.clone(),
            kid,
        });
    }

    let value = serde_json::to_value(vp).map_err(|e| Error::Other(e.into()))?;
    let Value::Object(mut claims) = value else {
        return Err(Error::MalformedInput("presentation must serialize to an object".into()));
    };
    let now = Utc::now().timestamp();
    let ttl = ttl.unwrap_or_else(|| TimeDelta::hours(1));
    insert_claims(&mut claims, Some(now), Some(now), Some(now + ttl.num_seconds()));

    tracing::debug!(holder = %vp.holder, "signing presentation");
    Ok(jws::encode(Some(PRESENTATION_TYP), &claims, signer).await?)
}

fn insert_claims(
    claims: &mut Map<String, Value>, iat: Option<i64>, nbf: Option<i64>, exp: Option<i64>,
) {
    for (name, value) in [("iat", iat), ("nbf", nbf), ("exp", exp)] {
        if let Some(value) = value {
            claims.insert(name.into(), value.into());
        }
    }
}

#[cfg(test)]
mod test {
    use attest_infosec::{Algorithm, Jws};
    use serde_json::json;

    use super::*;

    const KID: &str = "did:web:example.com#key-1";

    #[tokio::test]
    async fn sign_only_requested_claims() {
        let key = PrivateKeyJwk::generate(Algorithm::ES256);
        let payload = json!({"issuer": "did:web:example.com"});

        let options = SignOptions {
            kid: KID.into(),
            ..SignOptions::default()
        };
        let token = sign(&key, &payload, &options).await.expect("should sign");
        let jws = Jws::parse(&token).expect("should parse");
        assert_eq!(jws.header.kid, KID);
        assert_eq!(jws.payload, payload);

        let options = SignOptions {
            kid: KID.into(),
            iat: Some(1_700_000_000),
            exp: Some(1_700_003_600),
            nbf: None,
        };
        let token = sign(&key, &payload, &options).await.expect("should sign");
        let jws = Jws::parse(&token).expect("should parse");
        assert_eq!(jws.payload["iat"], json!(1_700_000_000));
        assert_eq!(jws.payload["exp"], json!(1_700_003_600));
        assert!(jws.payload.get("nbf").is_none());
    }

    #[tokio::test]
    async fn sign_rejects_non_object() {
        let key = PrivateKeyJwk::generate(Algorithm::ES256);
        let options = SignOptions {
            kid: KID.into(),
            ..SignOptions::default()
        };
        let err = sign(&key, &json!([1, 2]), &options).await.expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[tokio::test]
    async fn sign_requires_kid() {
        let key = PrivateKeyJwk::generate(Algorithm::ES256);
        let err =
            sign(&key, &json!({"a": 1}), &SignOptions::default()).await.expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[tokio::test]
    async fn credential_signed_by_other_did() {
        let key = PrivateKeyJwk::generate(Algorithm::ES256);
        let signer = KeySigner::new(key, "did:web:b.com#key-1").expect("should create");
        let subject = json!({"employeeId": "1"});
        let vc = VerifiableCredential::builder()
            .add_type("EmployeeIDCredential")
            .issuer("did:web:a.com")
            .add_subject(subject.as_object().cloned().map(Into::into).expect("object"))
            .build()
            .expect("should build");

        let err = sign_credential(&vc, &signer).await.expect_err("should fail");
        assert!(matches!(err, Error::IssuerKeyMismatch { .. }));
    }

    #[tokio::test]
    async fn presentation_claims() {
        let key = PrivateKeyJwk::generate(Algorithm::ES384);
        let signer = KeySigner::new(key, "did:web:holder.example#auth").expect("should create");
        let vp = VerifiablePresentation::builder()
            .holder("did:web:holder.example")
            .build()
            .expect("should build");

        let token = sign_presentation(&vp, &signer, Some(TimeDelta::minutes(5)))
            .await
            .expect("should sign");
        let jws = Jws::parse(&token).expect("should parse");
        assert_eq!(jws.header.typ.as_deref(), Some(PRESENTATION_TYP));

        let iat = jws.payload["iat"].as_i64().expect("iat should be set");
        assert_eq!(jws.payload["nbf"].as_i64(), Some(iat));
        assert_eq!(jws.payload["exp"].as_i64(), Some(iat + 300));
        assert_eq!(jws.payload["holder"], json!("did:web:holder.example"));
    }
}
