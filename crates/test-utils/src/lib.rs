//! # Test Utilities for Attest
//!
//! Key fixtures and a recording `did:web` transport for tests.
//!
//! This crate provides common utilities for the Attest project and is not
//! intended to be used directly.

mod client;
mod party;

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub use crate::client::MockClient;
pub use crate::party::Party;

// initalise tracing once for all tests
static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}
