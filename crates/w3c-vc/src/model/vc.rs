//! # W3C Verifiable Credentials Data Model
//!
//! An implementation of the W3C [Verifiable Credentials Data Model v2.0].
//!
//! [Verifiable Credentials Data Model v2.0]: https://www.w3.org/TR/vc-data-model-2.0

use std::collections::HashMap;

use attest_core::{Kind, Quota};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::BASE_CONTEXT;
use crate::{Error, Result};

/// Base type every credential carries.
pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// `VerifiableCredential` represents the W3C Verifiable Credential data model.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiableCredential {
    #[allow(rustdoc::bare_urls)]
    /// Maps property URIs into short-form aliases. The first item is
    /// "`https://www.w3.org/ns/credentials/v2`".
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The credential's URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The credential types: `VerifiableCredential` plus one or more specific
    /// types describing the claims.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// The issuer DID, or an object with an `id` property holding it.
    pub issuer: Kind<Issuer>,

    /// Claims about the credential subject(s).
    pub credential_subject: Quota<CredentialSubject>,

    /// An RFC3339 date-time the credential becomes valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// An RFC3339 date-time the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    /// Schemas the credential conforms to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<Quota<CredentialSchema>>,
}

impl VerifiableCredential {
    /// Returns a new [`VcBuilder`], which can be used to build a [`VerifiableCredential`]
    #[must_use]
    pub fn builder() -> VcBuilder {
        VcBuilder::new()
    }

    /// The issuer DID, whichever shape `issuer` takes.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Kind::String(id) => id,
            Kind::Object(issuer) => &issuer.id,
        }
    }
}

/// Issuer identifies the issuer of the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Issuer {
    /// The issuer DID.
    pub id: String,

    /// Issuer-specific fields that may be used to express additional
    /// information about the issuer.
    #[serde(flatten)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<HashMap<String, Value>>,
}

/// `CredentialSubject` holds claims about the subject(s) referenced by the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// A URI that uniquely identifies the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl From<Map<String, Value>> for CredentialSubject {
    fn from(mut claims: Map<String, Value>) -> Self {
        let id = match claims.remove("id") {
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                claims.insert("id".into(), other);
                None
            }
            None => None,
        };
        Self { id, claims }
    }
}

/// `CredentialSchema` names a JSON Schema the credential conforms to.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialSchema {
    /// The id the schema is registered under.
    pub id: String,

    /// The schema type, e.g. "`JsonSchema`".
    #[serde(rename = "type")]
    pub type_: String,
}

/// Structured data extracted from a source document, ready to be issued as a
/// credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    /// Specific credential types, without `VerifiableCredential`.
    pub credential_types: Vec<String>,

    /// The claims. Becomes `credentialSubject` unchanged.
    pub data: Map<String, Value>,

    /// Schema the data was extracted against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_metadata: Option<CredentialSchema>,
}

/// [`VcBuilder`] is used to build a [`VerifiableCredential`]
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct VcBuilder {
    vc: VerifiableCredential,
}

impl VcBuilder {
    /// Returns a new [`VcBuilder`]
    #[must_use]
    pub fn new() -> Self {
        let mut builder: Self = Self::default();

        // sensible defaults
        builder.vc.context.push(Kind::String(BASE_CONTEXT.into()));
        builder.vc.type_.push(CREDENTIAL_TYPE.into());
        builder.vc.valid_from = Some(Utc::now());

        builder
    }

    /// Start a credential from extracted data: its types become the
    /// credential's specific types, its data the subject and its schema
    /// metadata the `credentialSchema`.
    #[must_use]
    pub fn from_extraction(extraction: Extraction) -> Self {
        let mut builder = Self::new();
        for type_ in extraction.credential_types {
            builder = builder.add_type(type_);
        }
        if let Some(schema) = extraction.schema_metadata {
            builder = builder.add_schema(schema);
        }
        builder.add_subject(extraction.data.into())
    }

    /// Adds to the `@context` property
    #[must_use]
    pub fn add_context(mut self, context: Kind<Value>) -> Self {
        self.vc.context.push(context);
        self
    }

    /// Sets the `id` property
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vc.id = Some(id.into());
        self
    }

    /// Adds to the `type` property. The base type is never duplicated.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        let type_ = type_.into();
        if !self.vc.type_.contains(&type_) {
            self.vc.type_.push(type_);
        }
        self
    }

    /// Sets the `issuer` property
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.vc.issuer = Kind::String(issuer.into());
        self
    }

    /// Adds a `credentialSubject`.
    #[must_use]
    pub fn add_subject(mut self, subj: CredentialSubject) -> Self {
        let one_set = match self.vc.credential_subject {
            Quota::One(one) => {
                if one == CredentialSubject::default() {
                    Quota::One(subj)
                } else {
                    Quota::Many(vec![one, subj])
                }
            }
            Quota::Many(mut set) => {
                set.push(subj);
                Quota::Many(set)
            }
        };

        self.vc.credential_subject = one_set;
        self
    }

    /// Adds a `credentialSchema`.
    #[must_use]
    pub fn add_schema(mut self, schema: CredentialSchema) -> Self {
        let one_set = match self.vc.credential_schema {
            None => Quota::One(schema),
            Some(Quota::One(one)) => Quota::Many(vec![one, schema]),
            Some(Quota::Many(mut set)) => {
                set.push(schema);
                Quota::Many(set)
            }
        };

        self.vc.credential_schema = Some(one_set);
        self
    }

    /// Sets the `validFrom` property
    #[must_use]
    pub fn valid_from(mut self, valid_from: DateTime<Utc>) -> Self {
        self.vc.valid_from = Some(valid_from);
        self
    }

    /// Sets the `validUntil` property
    #[must_use]
    pub fn valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.vc.valid_until = Some(valid_until);
        self
    }

    /// Turns this builder into a [`VerifiableCredential`]
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidCredential`] if no specific type, issuer or
    /// subject is set.
    pub fn build(self) -> Result<VerifiableCredential> {
        tracing::debug!("VcBuilder::build");

        if !self.vc.type_.iter().any(|t| t == CREDENTIAL_TYPE) {
            return Err(Error::InvalidCredential(format!("type must include {CREDENTIAL_TYPE}")));
        }
        if self.vc.type_.len() < 2 {
            return Err(Error::InvalidCredential("no specific type set".into()));
        }
        if self.vc.issuer_id().is_empty() {
            return Err(Error::InvalidCredential("no issuer set".into()));
        }
        if let Quota::One(subj) = &self.vc.credential_subject {
            if *subj == CredentialSubject::default() {
                return Err(Error::InvalidCredential("no credential_subject set".into()));
            }
        }

        Ok(self.vc)
    }
}

impl TryFrom<VcBuilder> for VerifiableCredential {
    type Error = Error;

    fn try_from(builder: VcBuilder) -> Result<Self> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn subject() -> CredentialSubject {
        json!({"id": "did:web:holder.example", "employeeId": "1234567890"})
            .as_object()
            .cloned()
            .map(Into::into)
            .expect("should be an object")
    }

    #[test]
    fn builder() {
        let valid_from =
            Utc.with_ymd_and_hms(2024, 11, 20, 23, 21, 55).single().expect("should be valid");
        let vc = VerifiableCredential::builder()
            .id("https://example.com/credentials/3732")
            .add_type("EmployeeIDCredential")
            .valid_from(valid_from)
            .issuer("did:web:example.com")
            .add_subject(subject())
            .build()
            .expect("should build");

        let vc_json = serde_json::to_value(&vc).expect("should serialize to json");
        assert_eq!(vc_json["@context"], json!([BASE_CONTEXT]));
        assert_eq!(vc_json["type"], json!(["VerifiableCredential", "EmployeeIDCredential"]));
        assert_eq!(vc_json["issuer"], json!("did:web:example.com"));
        assert_eq!(vc_json["validFrom"], json!("2024-11-20T23:21:55Z"));
        assert_eq!(
            vc_json["credentialSubject"],
            json!({"id": "did:web:holder.example", "employeeId": "1234567890"})
        );

        let vc_de: VerifiableCredential =
            serde_json::from_value(vc_json).expect("should deserialize");
        assert_eq!(vc_de, vc);
    }

    #[test]
    fn specific_type_required() {
        let err = VerifiableCredential::builder()
            .issuer("did:web:example.com")
            .add_subject(subject())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidCredential(_)));

        // adding the base type again does not count
        let err = VerifiableCredential::builder()
            .add_type(CREDENTIAL_TYPE)
            .issuer("did:web:example.com")
            .add_subject(subject())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidCredential(_)));
    }

    #[test]
    fn issuer_and_subject_required() {
        let err = VerifiableCredential::builder()
            .add_type("EmployeeIDCredential")
            .add_subject(subject())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidCredential(_)));

        let err = VerifiableCredential::builder()
            .add_type("EmployeeIDCredential")
            .issuer("did:web:example.com")
            .build()
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidCredential(_)));
    }

    #[test]
    fn from_extraction() {
        let extraction: Extraction = serde_json::from_value(json!({
            "credentialTypes": ["DegreeCredential"],
            "data": {"name": "Alice", "degree": {"type": "BachelorDegree"}},
            "schemaMetadata": {"id": "https://example.com/schemas/degree", "type": "JsonSchema"}
        }))
        .expect("should deserialize");

        let vc = VcBuilder::from_extraction(extraction.clone())
            .issuer("did:web:university.example")
            .build()
            .expect("should build");

        assert_eq!(vc.type_, vec!["VerifiableCredential", "DegreeCredential"]);
        let subject = serde_json::to_value(&vc.credential_subject).expect("should serialize");
        assert_eq!(subject, Value::Object(extraction.data));
        assert_eq!(
            vc.credential_schema,
            Some(Quota::One(CredentialSchema {
                id: "https://example.com/schemas/degree".into(),
                type_: "JsonSchema".into(),
            }))
        );
    }

    #[test]
    fn issuer_object() {
        let vc: VerifiableCredential = serde_json::from_value(json!({
            "@context": [BASE_CONTEXT],
            "type": ["VerifiableCredential", "EmployeeIDCredential"],
            "issuer": {"id": "did:web:example.com", "name": "Example Corp"},
            "credentialSubject": {"employeeId": "1"}
        }))
        .expect("should deserialize");

        assert_eq!(vc.issuer_id(), "did:web:example.com");
        let Kind::Object(issuer) = &vc.issuer else {
            panic!("issuer should be an object");
        };
        assert_eq!(issuer.extra.as_ref().and_then(|e| e.get("name")), Some(&json!("Example Corp")));
    }

    #[test]
    fn empty_schema_list() {
        let schemas: Quota<CredentialSchema> = serde_json::from_value(json!([]))
            .expect("should deserialize");
        assert!(schemas.is_empty());

        let one = json!({"id": "https://example.com/schemas/a", "type": "JsonSchema"});
        let schemas: Quota<CredentialSchema> =
            serde_json::from_value(one).expect("should deserialize");
        assert!(schemas.is_one());
    }
}
