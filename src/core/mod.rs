//! # Core Module
//!
//! The hashing engine, independent of any command-line or GUI surface.
//!
//! ## Modules
//! - `blockhash` - block-mean perceptual fingerprints
//! - `comparator` - Hamming distance and match classification
//! - `decode` - encoded image bytes to RGBA pixels
//! - `digest` - multi-algorithm hashing facade

pub mod blockhash;
pub mod comparator;
pub mod decode;
pub mod digest;

// Re-export commonly used types
pub use blockhash::{hash_pixels, BlockhashConfig, Fingerprint, PixelView};
pub use comparator::{hamming_distance, similarity, MatchType};
pub use decode::PixelBuffer;
pub use digest::{Algorithm, HashValue, Hasher};
