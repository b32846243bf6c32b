//! # Verifiable Presentations
//!
//! [Verifiable Presentations](https://www.w3.org/TR/vc-data-model-2.0/#verifiable-presentations)
//!
//! A presentation carries signed credentials as [`EnvelopedCredential`]s: the
//! compact JWS wrapped in a `data:` URI.

use attest_core::Kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BASE_CONTEXT;
use crate::{Error, Result};

/// Base type every presentation carries.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Type of an enveloped credential.
pub const ENVELOPED_TYPE: &str = "EnvelopedVerifiableCredential";

/// Prefix of the `data:` URI an enveloped credential's JWS is carried in.
pub const ENVELOPED_PREFIX: &str = "data:application/vc+jwt,";

/// A Verifiable Presentation is used to combine and present credentials to a
/// Verifer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiablePresentation {
    /// Maps property URIs into short-form aliases.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// MAY be used to provide a unique identifier for the presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The presentation types. Includes `VerifiablePresentation`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// DID of the entity generating the presentation. Presentations are
    /// signed with one of its authentication keys.
    pub holder: String,

    /// The presented credentials.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verifiable_credential: Vec<EnvelopedCredential>,
}

impl VerifiablePresentation {
    /// Returns a new [`VpBuilder`], which can be used to build a
    /// [`VerifiablePresentation`]
    #[must_use]
    pub fn builder() -> VpBuilder {
        VpBuilder::new()
    }
}

/// A signed credential embedded in a presentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopedCredential {
    /// `data:application/vc+jwt,` followed by the compact JWS.
    pub id: String,

    /// Always `EnvelopedVerifiableCredential`.
    #[serde(rename = "type")]
    pub type_: String,
}

impl EnvelopedCredential {
    /// Wrap a signed credential.
    #[must_use]
    pub fn wrap(token: &str) -> Self {
        Self {
            id: format!("{ENVELOPED_PREFIX}{token}"),
            type_: ENVELOPED_TYPE.into(),
        }
    }

    /// The compact JWS carried by the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the envelope has the wrong type or
    /// its id is not a `data:application/vc+jwt,` URI.
    pub fn token(&self) -> Result<&str> {
        if self.type_ != ENVELOPED_TYPE {
            return Err(Error::MalformedInput(format!("unexpected envelope type {}", self.type_)));
        }
        self.id
            .strip_prefix(ENVELOPED_PREFIX)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::MalformedInput("envelope id is not a vc+jwt data URI".into()))
    }
}

/// [`VpBuilder`] is used to build a [`VerifiablePresentation`]
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct VpBuilder {
    vp: VerifiablePresentation,
}

impl VpBuilder {
    /// Returns a new [`VpBuilder`]
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self::default();

        // sensible defaults
        builder.vp.context.push(Kind::String(BASE_CONTEXT.into()));
        builder.vp.type_.push(PRESENTATION_TYPE.into());
        builder
    }

    /// Adds to the `@context` property
    #[must_use]
    pub fn add_context(mut self, context: Kind<Value>) -> Self {
        self.vp.context.push(context);
        self
    }

    /// Sets the `id` property
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vp.id = Some(id.into());
        self
    }

    /// Adds a signed credential, wrapped as an [`EnvelopedCredential`].
    #[must_use]
    pub fn add_credential(mut self, token: &str) -> Self {
        self.vp.verifiable_credential.push(EnvelopedCredential::wrap(token));
        self
    }

    /// Sets the `holder` property
    #[must_use]
    pub fn holder(mut self, holder: impl Into<String>) -> Self {
        self.vp.holder = holder.into();
        self
    }

    /// Turns this builder into a [`VerifiablePresentation`]
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidCredential`] if no holder is set.
    pub fn build(self) -> Result<VerifiablePresentation> {
        if self.vp.holder.is_empty() {
            return Err(Error::InvalidCredential("no holder set".into()));
        }
        Ok(self.vp)
    }
}

impl TryFrom<VpBuilder> for VerifiablePresentation {
    type Error = Error;

    fn try_from(builder: VpBuilder) -> Result<Self> {
        builder.build()
    }
}
