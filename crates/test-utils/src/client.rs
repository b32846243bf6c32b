use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use attest_did::{DidClient, DidWeb, Document};

/// An in-memory [`DidClient`] serving canned responses and recording every
/// URL requested. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MockClient {
    responses: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    /// Create a client with no responses. Every request fails until one is
    /// added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn respond(&self, url: impl Into<String>, body: Vec<u8>) {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).insert(url.into(), body);
    }

    /// Serve `document` at its `did:web` URL.
    ///
    /// # Panics
    ///
    /// Panics if the document id is not a valid `did:web`.
    pub fn publish(&self, document: &Document) {
        let url = DidWeb::url(&document.id).expect("document id should be a did:web");
        let body = serde_json::to_vec(document).expect("document should serialize");
        self.respond(url, body);
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DidClient for MockClient {
    async fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(url.to_string());
        let body = self.responses.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned();
        body.ok_or_else(|| anyhow!("404 Not Found: {url}"))
    }
}
