//! # Information Security for Attest
//!
//! This crate provides the JOSE building blocks used to issue and verify
//! credentials:
//!
//! - a closed key model over the NIST P-256 (`ES256`) and P-384 (`ES384`)
//!   curves ([`jose::jwa`], [`jose::jwk`]),
//! - the compact JWS codec ([`jose::jws`]),
//! - a key-bound [`Signer`] ([`KeySigner`]),
//! - role-scoped public key verifiers ([`KeyVerifierSet`]).

pub mod jose;
mod error;
mod signer;
mod verifier;

use std::future::Future;

pub use crate::error::Error;
pub use crate::jose::jwa::Algorithm;
pub use crate::jose::jwk::{Curve, KeyType, KeyUse, Keyring, PrivateKeyJwk, PublicKeyJwk};
pub use crate::jose::jws::{Header, Jws};
pub use crate::signer::KeySigner;
pub use crate::verifier::{KeyVerifier, KeyVerifierSet};

/// Result type for signing and verification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Signer is used by implementers to provide signing functionality for
/// Verifiable Credential issuance and Verifiable Presentation submissions.
pub trait Signer: Send + Sync {
    /// Algorithm returns the algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;

    /// The verification method the verifier should use to verify the signer's
    /// signature. This is typically a DID URL + # + verification key ID.
    fn verification_method(&self) -> String;

    /// Sign the message, returning the raw signature bytes.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}
