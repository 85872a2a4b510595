//! # Error Module
//!
//! Error types for the blockprint hashing engine.
//!
//! ## Design Principles
//! - **Never panic** on caller data - return errors instead
//! - **Fail whole** - a failed hash or comparison produces no partial output
//! - **Include context** - dimensions, lengths, what went wrong

use std::path::PathBuf;
use thiserror::Error;

/// Top-level crate error
#[derive(Error, Debug)]
pub enum BlockprintError {
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while computing a perceptual hash
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Invalid grid size {bits}: bits must be positive and bits*bits divisible by 4")]
    InvalidGridSize { bits: u32 },

    #[error("Invalid image dimensions {width}x{height}: both sides must be non-zero")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} bytes but {width}x{height} RGBA needs {expected}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Image {width}x{height} is smaller than the {bits}x{bits} grid; exact-division blocks would be empty. Drop the quick flag to use weighted aggregation.")]
    BlockTooSmall { width: u32, height: u32, bits: u32 },
}

/// Errors that occur while comparing fingerprints
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Missing {side} fingerprint")]
    MissingFingerprint { side: &'static str },

    #[error("Fingerprint lengths differ: {left} vs {right} bytes")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid fingerprint character {character:?} at position {position}")]
    InvalidHex { character: char, position: usize },
}

/// Errors that occur while decoding an image into pixels
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image: {reason}")]
    Malformed { reason: String },

    #[error("Failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, BlockprintError>;
