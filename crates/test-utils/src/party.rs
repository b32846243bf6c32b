use attest_did::{DidWeb, Document};
use attest_infosec::{Algorithm, KeySigner, Keyring};

/// An issuer or holder: a `did:web` identifier, its keyring and the controller
/// document publishing the keyring's public keys.
#[derive(Clone, Debug)]
pub struct Party {
    /// The party's DID.
    pub did: String,

    /// Assertion and authentication private keys.
    pub keyring: Keyring,

    /// The party's controller document.
    pub document: Document,
}

impl Party {
    /// A party with fresh ES256 keys.
    ///
    /// # Panics
    ///
    /// Panics if `did` is not a valid `did:web`.
    #[must_use]
    pub fn new(did: &str) -> Self {
        Self::with_algorithm(did, Algorithm::ES256)
    }

    /// A party with fresh keys for `alg`.
    ///
    /// # Panics
    ///
    /// Panics if `did` is not a valid `did:web`.
    #[must_use]
    pub fn with_algorithm(did: &str, alg: Algorithm) -> Self {
        let keyring = Keyring::generate(alg);
        let document = DidWeb::document(did, &keyring).expect("should build document");
        Self {
            did: did.to_string(),
            keyring,
            document,
        }
    }

    /// Key identifier of the assertion key.
    #[must_use]
    pub fn assertion_kid(&self) -> String {
        format!("{}#{}", self.did, self.keyring.assertion.kid())
    }

    /// Key identifier of the authentication key.
    #[must_use]
    pub fn authentication_kid(&self) -> String {
        format!("{}#{}", self.did, self.keyring.authentication.kid())
    }

    /// Signer for credentials.
    ///
    /// # Panics
    ///
    /// Panics if the generated key is inconsistent.
    #[must_use]
    pub fn assertion_signer(&self) -> KeySigner {
        KeySigner::for_did(self.keyring.assertion.clone(), &self.did).expect("should create signer")
    }

    /// Signer for presentations.
    ///
    /// # Panics
    ///
    /// Panics if the generated key is inconsistent.
    #[must_use]
    pub fn authentication_signer(&self) -> KeySigner {
        KeySigner::for_did(self.keyring.authentication.clone(), &self.did)
            .expect("should create signer")
    }
}
