//! # HTTP Client
//!
//! A [`DidClient`] backed by `reqwest`, used to fetch `did:web` documents.

use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::{DidClient, Error, Result};

/// Configures the HTTP client used to fetch controller documents.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Request timeout in seconds. An expired timeout is a fetch failure.
    pub timeout_secs: u64,

    /// `User-Agent` sent with requests. None sends no header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: None,
        }
    }
}

/// Fetches documents over HTTPS.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS backend cannot be initialised.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .https_only(true);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let inner =
            builder.build().map_err(|e| Error::Other(anyhow!("issue building client: {e}")))?;
        Ok(Self { inner })
    }
}

impl DidClient for HttpClient {
    async fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.inner.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
