//! # Blockprint
//!
//! Block-mean perceptual image hashing with a multi-algorithm hashing
//! facade.
//!
//! ## Core Philosophy
//! - **Distance is meaningful** - visually similar images land a few bits
//!   apart, unlike avalanche-effect digests
//! - **Deterministic** - identical pixels always produce byte-identical
//!   fingerprints, whatever the thread count
//! - **Not cryptographic** - fingerprints are trivially forgeable and must
//!   never gate trust decisions
//!
//! ## Architecture
//! The library is split into a core engine and a presentation layer:
//! - `core` - fingerprinting, comparison, decoding and the digest facade
//! - `error` - error types
//! - `cli` (bin only) - command-line interface

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{BlockprintError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
