//! # JSON Object Signing and Encryption (JOSE)
//!
//! The subset of JOSE needed to secure credentials as compact JWS: the JWA
//! algorithm identifiers, JWK key representations and the JWS codec.

pub mod jwa;
pub mod jwk;
pub mod jws;
