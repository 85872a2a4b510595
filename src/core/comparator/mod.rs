//! # Comparator Module
//!
//! Ranks fingerprints by Hamming distance.
//!
//! ## Distance Buckets
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Possibly similar |
//!
//! Fingerprint bytes carry 4 bits each, so only the low nibble of every
//! byte participates in the distance. The mask is part of the stored
//! fingerprint contract, not an optimization.

use crate::error::CompareError;
use serde::{Deserialize, Serialize};

/// Compute the Hamming distance between two fingerprints.
///
/// Both fingerprints must be present and of equal length. Returns the
/// number of differing bits, in `0..=4 * len`.
pub fn hamming_distance(left: Option<&[u8]>, right: Option<&[u8]>) -> Result<u32, CompareError> {
    let left = left.ok_or(CompareError::MissingFingerprint { side: "left" })?;
    let right = right.ok_or(CompareError::MissingFingerprint { side: "right" })?;

    if left.len() != right.len() {
        return Err(CompareError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    Ok(left
        .iter()
        .zip(right.iter())
        .map(|(a, b)| (((a ^ b) & 0x0f) as u32).count_ones())
        .sum())
}

/// Similarity between two fingerprints as a percentage (0-100).
pub fn similarity(left: &[u8], right: &[u8]) -> Result<f64, CompareError> {
    let distance = hamming_distance(Some(left), Some(right))?;
    let max_distance = (left.len() * 4) as u32;
    if max_distance == 0 {
        return Ok(100.0);
    }
    Ok((1.0 - (distance as f64 / max_distance as f64)) * 100.0)
}

/// Classification of a fingerprint distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, possibly related
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }

    /// Check if this match type is considered a duplicate
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            MatchType::Exact | MatchType::NearExact | MatchType::Similar
        )
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}
