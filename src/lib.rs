//! An API for issuing and verifying W3C Verifiable Credentials secured as
//! compact JWS ([VC-JOSE-COSE](https://w3c.github.io/vc-jose-cose)) and
//! anchored to [`did:web`](https://w3c-ccg.github.io/did-method-web)
//! identifiers.
//!
//! Issuers build a credential with [`w3c_vc::model::VcBuilder`] and sign it
//! with [`w3c_vc::proof::sign_credential`]. Verifiers resolve the issuer's
//! controller document, check the signing key belongs to the issuer, verify
//! the signature and, optionally, validate the credential against its JSON
//! Schemas with [`w3c_vc::verify::Verifier`].

/// Re-export DID resolution
pub mod did {
    pub use attest_did::*;
}

/// Re-export cryptographic types and functions
pub mod infosec {
    pub use attest_infosec::*;
}

/// Re-export the credential model, signing and verification
pub mod w3c_vc {
    pub use attest_w3c_vc::*;
}

/// Re-export basic types
pub use attest_core::{Kind, Quota};
pub use attest_w3c_vc::verify::{Verifier, VerifyOptions};
pub use attest_w3c_vc::{Error, Result};
