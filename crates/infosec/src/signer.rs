//! # Key Signer
//!
//! Binds a private key to the key identifier verifiers will use to find the
//! matching public key.

use p256::ecdsa::signature::Signer as _;

use crate::jose::jwa::Algorithm;
use crate::jose::jwk::{Curve, PrivateKeyJwk, PublicKeyJwk};
use crate::{Error, Result, Signer};

/// A [`Signer`] backed by an in-memory private key.
#[derive(Clone, Debug)]
pub struct KeySigner {
    key: PrivateKeyJwk,
    kid: String,
}

impl KeySigner {
    /// Create a signer for the key, advertising `kid` in signed headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if `kid` is empty and
    /// [`Error::InvalidKey`] if the private scalar cannot be decoded or does
    /// not correspond to the key's public coordinates.
    pub fn new(key: PrivateKeyJwk, kid: impl Into<String>) -> Result<Self> {
        let kid = kid.into();
        if kid.is_empty() {
            return Err(Error::MalformedInput("'kid' is empty".into()));
        }

        let public = match key.public.crv {
            Curve::P256 => p256::ecdsa::SigningKey::from_slice(&key.secret()?)
                .map(|sk| sk.verifying_key().to_encoded_point(false).as_bytes().to_vec()),
            Curve::P384 => p384::ecdsa::SigningKey::from_slice(&key.secret()?)
                .map(|sk| sk.verifying_key().to_encoded_point(false).as_bytes().to_vec()),
        }
        .map_err(|e| Error::InvalidKey(format!("issue decoding private key: {e}")))?;

        if public != key.public.to_sec1()? {
            return Err(Error::InvalidKey("private key does not match 'x' and 'y'".into()));
        }

        Ok(Self { key, kid })
    }

    /// Create a signer whose key identifier is `{did}#{thumbprint}`.
    ///
    /// # Errors
    ///
    /// See [`KeySigner::new`].
    pub fn for_did(key: PrivateKeyJwk, did: &str) -> Result<Self> {
        let kid = format!("{did}#{}", key.kid());
        Self::new(key, kid)
    }

    /// The public key verifiers need to check this signer's signatures.
    #[must_use]
    pub fn public_key(&self) -> PublicKeyJwk {
        self.key.to_public()
    }

    /// Sign the message, returning the fixed-length `r || s` signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the private key cannot be loaded.
    pub fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let secret = self.key.secret()?;
        match self.key.public.crv {
            Curve::P256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(&secret)
                    .map_err(|e| Error::InvalidKey(format!("issue loading key: {e}")))?;
                let sig: p256::ecdsa::Signature = signing_key
                    .try_sign(msg)
                    .map_err(|e| Error::Other(anyhow::anyhow!("issue signing: {e}")))?;
                Ok(sig.to_bytes().to_vec())
            }
            Curve::P384 => {
                let signing_key = p384::ecdsa::SigningKey::from_slice(&secret)
                    .map_err(|e| Error::InvalidKey(format!("issue loading key: {e}")))?;
                let sig: p384::ecdsa::Signature = signing_key
                    .try_sign(msg)
                    .map_err(|e| Error::Other(anyhow::anyhow!("issue signing: {e}")))?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }
}

impl Signer for KeySigner {
    fn algorithm(&self) -> Algorithm {
        self.key.algorithm()
    }

    fn verification_method(&self) -> String {
        self.kid.clone()
    }

    async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.sign(msg)?)
    }
}
