//! # Verifiable Credentials
//!
//! This library covers the parts of the W3C Recommendations for Verifiable
//! Credentials needed to issue and verify credentials secured as compact JWS
//! and anchored to `did:web` identifiers.
//!
//! - [`model`]: credential and presentation data model, with builders.
//! - [`proof`]: signing credentials and presentations.
//! - [`verify`]: binding, signature, validity and schema checks.
//! - [`schema`]: JSON Schema registration and compiled validator cache.

mod error;
pub mod model;
pub mod proof;
pub mod schema;
pub mod verify;

pub use crate::error::Error;

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, Error>;
