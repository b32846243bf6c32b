//! # Controller Resolver
//!
//! Resolves the controller document for a key identifier, serving it from the
//! local store when present and fetching `did:web` documents otherwise.
//!
//! Documents are stored per DID and are replaced wholesale on write. Failed
//! fetches are not stored, so a later call retries the network.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use attest_infosec::KeyVerifierSet;

use crate::client::{ClientConfig, HttpClient};
use crate::document::{Document, Relationship};
use crate::web::DidWeb;
use crate::{did_from_kid, DidClient, Error, Result};

/// A resolved controller: its document and the keys it authorizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controller {
    /// The controller document.
    pub document: Document,

    /// Keys authorized to sign credentials.
    pub assertion: KeyVerifierSet,

    /// Keys authorized to sign presentations.
    pub authentication: KeyVerifierSet,
}

impl From<Document> for Controller {
    fn from(document: Document) -> Self {
        Self {
            assertion: document.key_set(Relationship::AssertionMethod),
            authentication: document.key_set(Relationship::Authentication),
            document,
        }
    }
}

/// Resolves controller documents. Clones share the same store.
#[derive(Clone, Debug)]
pub struct ControllerResolver<C> {
    client: C,
    controllers: Arc<RwLock<HashMap<String, Document>>>,
}

impl ControllerResolver<HttpClient> {
    /// Create a resolver fetching over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::new(config)?))
    }
}

impl<C: DidClient> ControllerResolver<C> {
    /// Create a resolver with an empty store.
    pub fn new(client: C) -> Self {
        Self {
            client,
            controllers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store `document` as the controller for `id`, replacing any previous
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a relationship references a
    /// verification method the document does not contain.
    pub fn add_controller(&self, id: impl Into<String>, document: Document) -> Result<()> {
        document.validate()?;
        let id = id.into();
        tracing::debug!(did = %id, "storing controller");
        self.controllers.write().unwrap_or_else(PoisonError::into_inner).insert(id, document);
        Ok(())
    }

    /// The stored controller document for `id`, if any.
    #[must_use]
    pub fn controller(&self, id: &str) -> Option<Document> {
        self.controllers.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }

    /// Resolve the controller of the DID named by `kid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDid`] if `kid` does not name a DID and
    /// [`Error::ControllerNotFound`] if no document is stored and none could
    /// be fetched.
    pub async fn resolve_controller(&self, kid: &str) -> Result<Controller> {
        let did = did_from_kid(kid)?;

        if let Some(document) = self.controller(did) {
            tracing::debug!(did, "controller found in store");
            return Ok(document.into());
        }

        let document = self.fetch(did).await?;
        self.controllers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(did.to_string(), document.clone());

        Ok(document.into())
    }

    async fn fetch(&self, did: &str) -> Result<Document> {
        let url = match DidWeb::url(did) {
            Ok(url) => url,
            Err(Error::MethodNotSupported(_)) => {
                return Err(Error::ControllerNotFound(format!(
                    "no controller stored for {did} and its method cannot be fetched"
                )));
            }
            Err(e) => return Err(e),
        };

        let not_found = |reason: String| {
            tracing::warn!(did, url, "controller fetch failed: {reason}");
            Error::ControllerNotFound(format!("{did}: {reason}"))
        };

        let body = self
            .client
            .get(&url)
            .await
            .map_err(|e| not_found(format!("issue fetching document: {e}")))?;
        let document: Document = serde_json::from_slice(&body)
            .map_err(|e| not_found(format!("issue deserializing document: {e}")))?;

        if document.id != did {
            return Err(not_found(format!("document id {} does not match", document.id)));
        }
        document.validate().map_err(|e| not_found(e.to_string()))?;

        tracing::debug!(did, url, "controller fetched");
        Ok(document)
    }
}
