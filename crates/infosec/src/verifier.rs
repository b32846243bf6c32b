//! # Public Key Verifiers
//!
//! A [`KeyVerifierSet`] holds the public keys a controller has authorized for
//! one verification relationship (assertion or authentication). Resolving a
//! key identifier yields a [`KeyVerifier`] bound to exactly that key.

use std::collections::HashMap;

use serde_json::Value;

use crate::jose::jwk::PublicKeyJwk;
use crate::jose::jws::Jws;
use crate::{Error, Result};

/// Public keys for a single verification relationship, indexed by key
/// identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyVerifierSet {
    keys: HashMap<String, PublicKeyJwk>,
}

impl KeyVerifierSet {
    /// Build a set from `(kid, public key)` pairs.
    pub fn new(keys: impl IntoIterator<Item = (String, PublicKeyJwk)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Resolve the verifier for `kid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is not in the set.
    pub fn resolve(&self, kid: &str) -> Result<KeyVerifier> {
        let Some(jwk) = self.keys.get(kid) else {
            return Err(Error::KeyNotFound(format!("{kid} is not an authorized key")));
        };
        Ok(KeyVerifier {
            kid: kid.to_string(),
            jwk: jwk.clone(),
        })
    }

    /// Whether the set contains `kid`.
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    /// Key identifiers in the set, in no particular order.
    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Verifies compact JWS signed by one specific key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyVerifier {
    kid: String,
    jwk: PublicKeyJwk,
}

impl KeyVerifier {
    /// The key identifier this verifier is bound to.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The public key this verifier checks against.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKeyJwk {
        &self.jwk
    }

    /// Verify the token and return its payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the token cannot be parsed,
    /// [`Error::KeyMismatch`] if the header names a different key, and
    /// [`Error::SignatureInvalid`] if the signature does not verify.
    pub fn verify(&self, token: &str) -> Result<Value> {
        let jws = Jws::parse(token)?;
        if jws.header.kid != self.kid {
            return Err(Error::KeyMismatch {
                expected: self.kid.clone(),
                actual: jws.header.kid,
            });
        }

        jws.verify(&self.jwk)?;
        tracing::debug!(kid = %self.kid, "signature verified");
        Ok(jws.payload)
    }
}

#[cfg(test)]
mod test {
    use base64ct::{Base64UrlUnpadded, Encoding};
    use serde_json::json;

    use super::*;
    use crate::jose::jwa::Algorithm;
    use crate::jose::jwk::PrivateKeyJwk;
    use crate::jose::jws;
    use crate::KeySigner;

    const KID: &str = "did:web:example.com#key-0";

    fn fixture() -> (KeySigner, KeyVerifierSet) {
        let signer =
            KeySigner::new(PrivateKeyJwk::generate(Algorithm::ES256), KID).expect("should create");
        let set = KeyVerifierSet::new([(KID.to_string(), signer.public_key())]);
        (signer, set)
    }

    #[tokio::test]
    async fn verify_round_trip() {
        let (signer, set) = fixture();
        let payload = json!({"issuer": "did:web:example.com", "credentialSubject": {"a": 1}});
        let token = jws::encode(None, &payload, &signer).await.expect("should encode");

        let verified =
            set.resolve(KID).expect("should resolve").verify(&token).expect("should verify");
        assert_eq!(verified, payload);
    }

    #[test]
    fn unknown_key() {
        let (_, set) = fixture();
        let err = set.resolve("did:web:example.com#key-9").expect_err("should fail");
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn borrowed_verifier_rejects_other_kid() {
        let (_, set) = fixture();
        let key = PrivateKeyJwk::generate(Algorithm::ES256);
        let other = KeySigner::new(key, "did:web:example.com#key-1").expect("should create");
        let token = jws::encode(None, &json!({}), &other).await.expect("should encode");

        let err =
            set.resolve(KID).expect("should resolve").verify(&token).expect_err("should fail");
        assert!(matches!(err, Error::KeyMismatch { .. }));
    }

    #[tokio::test]
    async fn tampered_signature() {
        let (signer, set) = fixture();
        let token = jws::encode(None, &json!({"a": 1}), &signer).await.expect("should encode");

        let mut sig = Jws::parse(&token).expect("should parse").signature().expect("should decode");
        sig[10] ^= 0x01;
        let (signing_input, _) = token.rsplit_once('.').expect("should split");
        let tampered = format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&sig));

        let err =
            set.resolve(KID).expect("should resolve").verify(&tampered).expect_err("should fail");
        assert!(matches!(err, Error::SignatureInvalid(_)));
    }
}
