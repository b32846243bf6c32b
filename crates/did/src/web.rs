//! # DID Web
//!
//! The `did:web` method uses a web domain's reputation to confer trust.
//!
//! See:
//!
//! - <https://w3c-ccg.github.io/did-method-web>
//! - <https://w3c.github.io/did-resolution>

use std::sync::LazyLock;

use attest_core::Kind;
use attest_infosec::{Keyring, PublicKeyJwk};
use regex::Regex;
use url::Url;

use crate::document::{Document, MethodType, VerificationMethod};
use crate::{Error, Result};

static DID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^did:web:(?<identifier>[a-zA-Z0-9._~%:-]+)$").expect("should compile")
});

/// Operations for the `did:web` method.
#[allow(clippy::module_name_repetitions)]
pub struct DidWeb;

impl DidWeb {
    /// The HTTPS URL the controller document for `did` is published at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotSupported`] for other DID methods and
    /// [`Error::InvalidDid`] if the identifier is malformed.
    pub fn url(did: &str) -> Result<String> {
        if !did.starts_with("did:web:") {
            return Err(Error::MethodNotSupported(format!("{did} is not a did:web")));
        }
        let Some(caps) = DID_REGEX.captures(did) else {
            return Err(Error::InvalidDid(format!("{did} is not a valid did:web")));
        };
        let identifier = &caps["identifier"];
        if identifier.split(':').any(str::is_empty) {
            return Err(Error::InvalidDid(format!("{did} has an empty segment")));
        }

        // 1. Replace ":" with "/" in the method specific identifier to obtain the fully
        //    qualified domain name and optional path.
        let path = identifier.replace(':', "/");

        // 2. If the domain contains a port percent decode the colon.
        let path = path.replacen("%3A", ":", 1);

        // 3. Prepend https:// and, with no path, append /.well-known.
        let mut url = format!("https://{path}");
        if !identifier.contains(':') {
            url.push_str("/.well-known");
        }

        // 4. Append /did.json to complete the URL.
        url.push_str("/did.json");

        tracing::debug!(did, url, "derived did:web url");
        Ok(url)
    }

    /// The `did:web` identifier for a site URL, such as
    /// `https://example.com/org/alpha` → `did:web:example.com:org:alpha`.
    ///
    /// A trailing `/did.json` or `/.well-known/did.json` is ignored so the
    /// operation reverses [`DidWeb::url`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDid`] if the URL cannot be parsed or has no host.
    pub fn did_from_url(url: &str) -> Result<String> {
        let url =
            Url::parse(url).map_err(|e| Error::InvalidDid(format!("issue parsing url: {e}")))?;
        let host = url.host_str().ok_or_else(|| Error::InvalidDid("no host in url".into()))?;

        let mut did = format!("did:web:{host}");
        if let Some(port) = url.port() {
            did.push_str(&format!("%3A{port}"));
        }

        let path = url.path().trim_end_matches('/');
        let path = path.strip_suffix("/did.json").unwrap_or(path);
        let path = path.strip_suffix("/.well-known").unwrap_or(path);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            did.push(':');
            did.push_str(segment);
        }

        Ok(did)
    }

    /// Build a controller document publishing the keyring's public keys: the
    /// assertion key under `assertionMethod` and the authentication key under
    /// `authentication`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDid`] if `did` is not a valid `did:web`.
    pub fn document(did: &str, keyring: &Keyring) -> Result<Document> {
        Self::url(did)?;

        let method = |jwk: PublicKeyJwk| VerificationMethod {
            id: format!("{did}#{}", jwk.thumbprint()),
            type_: MethodType::JsonWebKey,
            controller: did.to_string(),
            public_key_jwk: Some(jwk),
            public_key_multibase: None,
        };
        let assertion = method(keyring.assertion.to_public());
        let authentication = method(keyring.authentication.to_public());

        let assertion_method = vec![Kind::String(assertion.id.clone())];
        let auth = vec![Kind::String(authentication.id.clone())];
        let mut verification_method = vec![assertion];
        if verification_method[0].id != authentication.id {
            verification_method.push(authentication);
        }

        Ok(Document {
            context: vec![
                Kind::String("https://www.w3.org/ns/did/v1".into()),
                Kind::String("https://w3id.org/security/jwk/v1".into()),
            ],
            id: did.to_string(),
            also_known_as: None,
            verification_method,
            assertion_method,
            authentication: auth,
        })
    }
}
