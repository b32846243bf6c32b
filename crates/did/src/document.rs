//! # Controller Document
//!
//! A controller (DID) document lists the verification methods a DID subject
//! controls and the relationships those methods may be used for.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use attest_core::Kind;
use attest_infosec::{KeyVerifierSet, PublicKeyJwk};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A DID document expressing the verification methods of a DID subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// JSON-LD context. SHOULD include `"https://www.w3.org/ns/did/v1"`.
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<Kind<Value>>,

    /// The DID of the subject described by the document.
    pub id: String,

    /// Other identifiers for the subject of the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// Verification methods for the DID subject.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Methods the subject uses to express claims, such as issuing a
    /// Verifiable Credential.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<Kind<VerificationMethod>>,

    /// Methods the subject uses to authenticate, such as presenting
    /// credentials it holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<Kind<VerificationMethod>>,
}

/// A public key the DID subject controls.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// A DID URL identifying the method. May be relative (`#key-1`) to the
    /// containing document.
    pub id: String,

    /// The verification method type.
    #[serde(rename = "type")]
    pub type_: MethodType,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// The public key as a JWK. Keys on curves other than P-256 and P-384 are
    /// dropped when the document is read.
    #[serde(
        default,
        deserialize_with = "supported_jwk",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key_jwk: Option<PublicKeyJwk>,

    /// The public key encoded as a Multibase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
}

/// Verification method types.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum MethodType {
    /// Key is a JWK (`publicKeyJwk`).
    #[default]
    JsonWebKey,

    /// JWK, 2020 version.
    JsonWebKey2020,

    /// Key is encoded as a Multibase (`publicKeyMultibase`).
    Multikey,

    /// Any other registered type.
    #[serde(untagged)]
    Other(String),
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonWebKey => write!(f, "JsonWebKey"),
            Self::JsonWebKey2020 => write!(f, "JsonWebKey2020"),
            Self::Multikey => write!(f, "Multikey"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

/// Verification relationships the crate partitions keys by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relationship {
    /// `assertionMethod`: signing credentials.
    AssertionMethod,

    /// `authentication`: signing presentations.
    Authentication,
}

fn supported_jwk<'de, D>(deserializer: D) -> std::result::Result<Option<PublicKeyJwk>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(jwk) => Ok(Some(jwk)),
        Err(e) => {
            tracing::debug!("ignoring unsupported publicKeyJwk: {e}");
            Ok(None)
        }
    }
}

impl Document {
    /// Resolve a (possibly relative) DID URL against the document id.
    #[must_use]
    pub fn absolute_id(&self, id: &str) -> String {
        if id.starts_with('#') {
            format!("{}{id}", self.id)
        } else {
            id.to_string()
        }
    }

    /// Find the verification method with the given (possibly relative) id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&VerificationMethod> {
        let id = self.absolute_id(id);
        self.verification_method.iter().find(|vm| self.absolute_id(&vm.id) == id)
    }

    /// Check every string reference in `assertionMethod` and `authentication`
    /// names an entry in `verificationMethod`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] naming the first dangling
    /// reference, or an empty document id.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidDocument("document id is empty".into()));
        }

        let known: HashSet<String> =
            self.verification_method.iter().map(|vm| self.absolute_id(&vm.id)).collect();

        let references = self.assertion_method.iter().chain(&self.authentication);
        for reference in references.filter_map(Kind::as_string) {
            if !known.contains(&self.absolute_id(reference)) {
                return Err(Error::InvalidDocument(format!(
                    "{reference} does not reference a verification method"
                )));
            }
        }
        Ok(())
    }

    /// Verification methods authorized for the relationship, with embedded
    /// methods included and references resolved.
    #[must_use]
    pub fn methods(&self, relationship: Relationship) -> Vec<&VerificationMethod> {
        let entries = match relationship {
            Relationship::AssertionMethod => &self.assertion_method,
            Relationship::Authentication => &self.authentication,
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Kind::String(id) => self.find(id),
                Kind::Object(vm) => Some(vm),
            })
            .collect()
    }

    /// Public keys authorized for the relationship, keyed by absolute method
    /// id. Methods without a supported `publicKeyJwk` are skipped.
    #[must_use]
    pub fn key_set(&self, relationship: Relationship) -> KeyVerifierSet {
        KeyVerifierSet::new(self.methods(relationship).into_iter().filter_map(|vm| {
            let jwk = vm.public_key_jwk.clone()?;
            Some((self.absolute_id(&vm.id), jwk))
        }))
    }
}

#[cfg(test)]
mod test {
    use attest_infosec::{Algorithm, PrivateKeyJwk};
    use serde_json::json;

    use super::*;

    const DID: &str = "did:web:example.com";

    fn jwk() -> Value {
        serde_json::to_value(PrivateKeyJwk::generate(Algorithm::ES256).to_public())
            .expect("should serialize")
    }

    #[test]
    fn relative_references() {
        let doc: Document = serde_json::from_value(json!({
            "id": DID,
            "verificationMethod": [
                {"id": "#key-1", "type": "JsonWebKey", "controller": DID, "publicKeyJwk": jwk()},
                {
                    "id": "did:web:example.com#key-2",
                    "type": "JsonWebKey",
                    "controller": DID,
                    "publicKeyJwk": jwk()
                }
            ],
            "assertionMethod": ["did:web:example.com#key-1"],
            "authentication": ["#key-2"]
        }))
        .expect("should deserialize");

        doc.validate().expect("should be valid");

        let assertion = doc.key_set(Relationship::AssertionMethod);
        assert!(assertion.contains("did:web:example.com#key-1"));
        assert_eq!(assertion.len(), 1);

        let authentication = doc.key_set(Relationship::Authentication);
        assert!(authentication.contains("did:web:example.com#key-2"));
        assert_eq!(authentication.len(), 1);
    }

    #[test]
    fn dangling_reference() {
        let doc: Document = serde_json::from_value(json!({
            "id": DID,
            "verificationMethod": [
                {"id": "#key-1", "type": "JsonWebKey", "controller": DID, "publicKeyJwk": jwk()}
            ],
            "assertionMethod": ["#key-9"]
        }))
        .expect("should deserialize");

        let err = doc.validate().expect_err("should be invalid");
        assert!(matches!(err, Error::InvalidDocument(_)));
    }

    #[test]
    fn embedded_method() {
        let doc: Document = serde_json::from_value(json!({
            "id": DID,
            "assertionMethod": [
                {"id": "#embedded", "type": "JsonWebKey", "controller": DID, "publicKeyJwk": jwk()}
            ]
        }))
        .expect("should deserialize");

        doc.validate().expect("should be valid");
        let keys = doc.key_set(Relationship::AssertionMethod);
        assert!(keys.contains("did:web:example.com#embedded"));
        assert!(doc.key_set(Relationship::Authentication).is_empty());
    }

    #[test]
    fn unsupported_key_is_skipped() {
        let doc: Document = serde_json::from_value(json!({
            "id": DID,
            "verificationMethod": [{
                "id": "#ed",
                "type": "Ed25519VerificationKey2020",
                "controller": DID,
                "publicKeyJwk": {
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
                }
            }],
            "assertionMethod": ["#ed"]
        }))
        .expect("should deserialize");

        let method_type = MethodType::Other("Ed25519VerificationKey2020".into());
        assert_eq!(doc.verification_method[0].type_, method_type);
        assert!(doc.verification_method[0].public_key_jwk.is_none());
        assert!(doc.key_set(Relationship::AssertionMethod).is_empty());
    }
}
