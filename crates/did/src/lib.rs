//! # DID Controller Resolution
//!
//! The crate resolves the controller document of a `did:web` identifier and
//! exposes the public keys it authorizes, grouped by verification
//! relationship.
//!
//! Resolution is local first: documents added with
//! [`ControllerResolver::add_controller`] or fetched earlier are served from
//! an in-memory store. Otherwise the `did:web` identifier is transformed into
//! an HTTPS URL and fetched through a [`DidClient`].
//!
//! See [DID resolution](https://www.w3.org/TR/did-core/#did-resolution) and
//! [did:web](https://w3c-ccg.github.io/did-method-web) for more.

mod client;
mod document;
mod error;
mod resolver;
mod web;

use std::future::Future;

pub use crate::client::{ClientConfig, HttpClient};
pub use crate::document::{Document, MethodType, Relationship, VerificationMethod};
pub use crate::error::Error;
pub use crate::resolver::{Controller, ControllerResolver};
pub use crate::web::DidWeb;

/// Returns DID-specific errors.
pub type Result<T> = std::result::Result<T, Error>;

/// `DidClient` is used to proxy the retrieval of a DID document over HTTPS.
///
/// Implementers simply implement the transport and return the raw response
/// body. Any non-success status must be returned as an error.
pub trait DidClient: Send + Sync {
    /// Fetch the resource at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response status is not
    /// successful.
    fn get(&self, url: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// The DID portion of a key identifier (everything before `#`).
///
/// # Errors
///
/// Returns [`Error::InvalidDid`] if the key identifier does not start with a
/// DID.
pub fn did_from_kid(kid: &str) -> Result<&str> {
    let did = kid.split_once('#').map_or(kid, |(did, _)| did);
    if !did.starts_with("did:") || did.len() <= "did:".len() {
        return Err(Error::InvalidDid(format!("{kid} does not contain a DID")));
    }
    Ok(did)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strip_fragment() {
        assert_eq!(did_from_kid("did:web:a.com#key-1").expect("should strip"), "did:web:a.com");
        assert_eq!(did_from_kid("did:web:a.com").expect("no fragment"), "did:web:a.com");
        assert!(matches!(did_from_kid("#key-1"), Err(Error::InvalidDid(_))));
    }
}
