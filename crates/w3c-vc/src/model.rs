//! # Verifiable Credentials Data Model
//!
//! The Verifiable Credentials [Data Model v2.0] specification defines core VC
//! concepts. Credentials and presentations are serialized as JSON and secured
//! as compact JWS (see [`crate::proof`]).
//!
//! [Data Model v2.0]: https://www.w3.org/TR/vc-data-model-2.0

mod vc;
mod vp;

pub use vc::*;
pub use vp::*;

/// Base context for credentials and presentations.
pub const BASE_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";
