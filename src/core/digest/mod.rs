//! # Digest Module
//!
//! Stream-in/bytes-out hashing facade over one explicit algorithm
//! enumeration: the classical digests plus the perceptual block hash.
//!
//! ## How It Works
//! - Classical algorithms consume the raw byte stream in fixed chunks
//! - `Blockhash` decodes the bytes as an image first, then fingerprints
//!   the pixels
//!
//! Dispatch is a plain `match` on [`Algorithm`]; there is deliberately no
//! trait-object or downcast machinery between the facade and the
//! strategies.
//!
//! ## Example
//! ```rust,ignore
//! use blockprint::core::digest::{Algorithm, Hasher};
//!
//! let hasher = Hasher::new(Algorithm::Blockhash);
//! let value = hasher.hash_file(&path)?;
//! println!("{}", value.to_hex());
//! ```

mod crc32;

pub use crc32::Crc32;

use crate::core::blockhash::{self, BlockhashConfig, Fingerprint};
use crate::core::decode;
use crate::error::Result;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;
use std::path::Path;

/// Stream chunk size for classical digests
const STREAM_CHUNK: usize = 64 * 1024;

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// MD5 message digest (legacy interop only)
    Md5,
    /// Zip-compatible CRC-32 checksum
    Crc32,
    /// SHA-1 (legacy interop only)
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
    /// Block-mean perceptual image hash
    Blockhash,
}

impl Algorithm {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5 - 128-bit digest, legacy interop only",
            Algorithm::Crc32 => "CRC-32 - zip-compatible checksum",
            Algorithm::Sha1 => "SHA-1 - 160-bit digest, legacy interop only",
            Algorithm::Sha256 => "SHA-256 - 256-bit digest",
            Algorithm::Sha512 => "SHA-512 - 512-bit digest",
            Algorithm::Blockhash => {
                "Blockhash - block-mean perceptual image fingerprint, compared by Hamming distance"
            }
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Md5 => write!(f, "md5"),
            Algorithm::Crc32 => write!(f, "crc32"),
            Algorithm::Sha1 => write!(f, "sha1"),
            Algorithm::Sha256 => write!(f, "sha256"),
            Algorithm::Sha512 => write!(f, "sha512"),
            Algorithm::Blockhash => write!(f, "blockhash"),
        }
    }
}

/// Output of the facade: a perceptual fingerprint or a classical digest.
///
/// The two render differently: fingerprints print one hex character per
/// nibble byte, digests the usual two per byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashValue {
    /// Perceptual fingerprint, compared by Hamming distance
    Perceptual(Fingerprint),
    /// Classical digest bytes
    Digest(Vec<u8>),
}

impl HashValue {
    /// The raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HashValue::Perceptual(fingerprint) => fingerprint.as_bytes(),
            HashValue::Digest(bytes) => bytes,
        }
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        match self {
            HashValue::Perceptual(fingerprint) => fingerprint.to_hex(),
            HashValue::Digest(bytes) => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
        }
    }

    /// The perceptual fingerprint, if this value is one
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            HashValue::Perceptual(fingerprint) => Some(fingerprint),
            HashValue::Digest(_) => None,
        }
    }
}

/// Hashing facade dispatching on an explicit algorithm choice
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: Algorithm,
    blockhash: BlockhashConfig,
}

impl Hasher {
    /// Create a hasher for the given algorithm with default block-hash
    /// parameters.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            blockhash: BlockhashConfig::new(),
        }
    }

    /// Override the block-hash grid configuration. Classical algorithms
    /// ignore it.
    pub fn blockhash_config(mut self, config: BlockhashConfig) -> Self {
        self.blockhash = config;
        self
    }

    /// The configured algorithm
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Hash an in-memory buffer.
    pub fn hash_bytes(&self, bytes: &[u8]) -> Result<HashValue> {
        match self.algorithm {
            Algorithm::Md5 => Ok(HashValue::Digest(Md5::digest(bytes).to_vec())),
            Algorithm::Sha1 => Ok(HashValue::Digest(Sha1::digest(bytes).to_vec())),
            Algorithm::Sha256 => Ok(HashValue::Digest(Sha256::digest(bytes).to_vec())),
            Algorithm::Sha512 => Ok(HashValue::Digest(Sha512::digest(bytes).to_vec())),
            Algorithm::Crc32 => {
                let mut crc = Crc32::new();
                crc.update(bytes);
                Ok(HashValue::Digest(crc.finalize().to_vec()))
            }
            Algorithm::Blockhash => {
                let pixels = decode::decode_bytes(bytes)?;
                let fingerprint = blockhash::hash_pixels(pixels.view(), &self.blockhash)?;
                Ok(HashValue::Perceptual(fingerprint))
            }
        }
    }

    /// Hash a byte stream.
    ///
    /// Classical digests never buffer more than one chunk; the block hash
    /// needs the whole image in memory before it can decode.
    pub fn hash_reader<R: Read>(&self, reader: &mut R) -> Result<HashValue> {
        match self.algorithm {
            Algorithm::Md5 => Ok(HashValue::Digest(digest_reader::<Md5, R>(reader)?)),
            Algorithm::Sha1 => Ok(HashValue::Digest(digest_reader::<Sha1, R>(reader)?)),
            Algorithm::Sha256 => Ok(HashValue::Digest(digest_reader::<Sha256, R>(reader)?)),
            Algorithm::Sha512 => Ok(HashValue::Digest(digest_reader::<Sha512, R>(reader)?)),
            Algorithm::Crc32 => {
                let mut crc = Crc32::new();
                let mut buffer = vec![0u8; STREAM_CHUNK];
                loop {
                    let n = reader.read(&mut buffer)?;
                    if n == 0 {
                        break;
                    }
                    crc.update(&buffer[..n]);
                }
                Ok(HashValue::Digest(crc.finalize().to_vec()))
            }
            Algorithm::Blockhash => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                self.hash_bytes(&bytes)
            }
        }
    }

    /// Hash a file, memory-mapping large inputs.
    pub fn hash_file(&self, path: &Path) -> Result<HashValue> {
        let bytes = decode::read_file_bytes(path)?;
        self.hash_bytes(&bytes)
    }
}

fn digest_reader<D: Digest, R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; STREAM_CHUNK];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_vec())
}
