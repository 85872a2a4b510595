//! # Blockhash Module
//!
//! Computes block-mean perceptual fingerprints for decoded images.
//!
//! ## How It Works
//! 1. Partition the image into a bits x bits grid of spatial blocks
//! 2. Aggregate per-pixel intensity (R+G+B, transparent counts as blank)
//!    into one sum per block
//! 3. Threshold each quarter of the flattened grid at its own median
//! 4. Pack every 4 bits into one output byte, most-significant first
//!
//! Two aggregation paths exist: an exact-division path for images whose
//! dimensions divide evenly by the grid size, and a bilinear-weighted path
//! for everything else. Identical input always produces a byte-identical
//! fingerprint.
//!
//! The fingerprint is *not* a cryptographic hash: nearby inputs are meant
//! to collide almost-exactly, and nothing resists adversarial preimages.
//!
//! ## Example
//! ```rust,ignore
//! use blockprint::core::blockhash::{hash_pixels, BlockhashConfig, PixelView};
//!
//! let view = PixelView::new(width, height, &rgba)?;
//! let fingerprint = hash_pixels(view, &BlockhashConfig::new())?;
//! println!("{}", fingerprint.to_hex());
//! ```

mod aggregate;
mod pack;
mod quantize;

use crate::core::comparator;
use crate::error::{CompareError, HashError};
use serde::{Deserialize, Serialize};

/// Default grid side length: 16x16 blocks, a 256-bit fingerprint.
pub const DEFAULT_BITS: u32 = 16;

/// Borrowed view of a decoded image: row-major RGBA, 4 bytes per pixel.
///
/// The hashing core never owns or mutates pixels; callers keep the buffer
/// and hand out views per call.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    /// Wrap an RGBA buffer, validating dimensions against its length.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, HashError> {
        if width == 0 || height == 0 {
            return Err(HashError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(HashError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Construct without re-validating. For buffers validated at decode time.
    pub(crate) fn from_validated(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// Configuration for the block-mean hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockhashConfig {
    /// Grid side length; the fingerprint carries bits*bits bits
    bits: u32,
    /// Force the exact-division path even for unevenly divisible images
    quick: bool,
}

impl BlockhashConfig {
    /// Create a configuration with defaults (16x16 grid, automatic path
    /// selection).
    pub fn new() -> Self {
        Self {
            bits: DEFAULT_BITS,
            quick: false,
        }
    }

    /// Set the grid side length.
    ///
    /// Larger grids are more discriminating but slower to compare.
    /// - 8: 64 bits, coarse
    /// - 16: 256 bits, the common choice
    /// - 32: 1024 bits, very fine
    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Force the exact-division aggregation path.
    ///
    /// With `quick` unset the exact path is still chosen automatically
    /// whenever both image dimensions divide evenly by `bits`.
    pub fn quick(mut self, quick: bool) -> Self {
        self.quick = quick;
        self
    }

    /// The configured grid side length
    pub fn grid_bits(&self) -> u32 {
        self.bits
    }

    /// Whether the exact path is forced
    pub fn is_quick(&self) -> bool {
        self.quick
    }

    fn validate(&self) -> Result<(), HashError> {
        let total_bits = self.bits as u64 * self.bits as u64;
        if self.bits == 0 || total_bits % 4 != 0 {
            return Err(HashError::InvalidGridSize { bits: self.bits });
        }
        Ok(())
    }
}

impl Default for BlockhashConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A computed block-mean fingerprint.
///
/// Each byte carries 4 fingerprint bits in its low nibble; a 16x16 grid
/// yields 64 bytes. The canonical rendering is lowercase hex with one
/// character per byte. Comparisons mask the high nibble, so fingerprints
/// restored from storage compare identically however the unused nibble
/// was filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    pub(crate) fn from_nibbles(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse a fingerprint from its canonical hex form, one character per
    /// nibble byte.
    pub fn from_hex(hex: &str) -> Result<Self, CompareError> {
        let mut bytes = Vec::with_capacity(hex.len());
        for (position, character) in hex.chars().enumerate() {
            let nibble = character
                .to_digit(16)
                .ok_or(CompareError::InvalidHex {
                    character,
                    position,
                })?;
            bytes.push(nibble as u8);
        }
        Ok(Self { bytes })
    }

    /// The raw fingerprint bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Canonical lowercase-hex rendering, one character per byte.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:x}", b)).collect()
    }

    /// Total number of fingerprint bits
    pub fn bit_count(&self) -> u32 {
        (self.bytes.len() * 4) as u32
    }

    /// Hamming distance to another fingerprint of the same length.
    pub fn distance(&self, other: &Fingerprint) -> Result<u32, CompareError> {
        comparator::hamming_distance(Some(&self.bytes), Some(&other.bytes))
    }

    /// Similarity to another fingerprint as a percentage (0-100).
    pub fn similarity(&self, other: &Fingerprint) -> Result<f64, CompareError> {
        comparator::similarity(&self.bytes, &other.bytes)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the block-mean fingerprint of a decoded RGBA image.
///
/// The whole pipeline is a single deterministic pass; any failure aborts
/// with no partial fingerprint.
pub fn hash_pixels(
    image: PixelView<'_>,
    config: &BlockhashConfig,
) -> Result<Fingerprint, HashError> {
    config.validate()?;
    let grid = aggregate::aggregate(image, config)?;
    let bits = quantize::quantize(&grid);
    Ok(Fingerprint::from_nibbles(pack::pack_nibbles(&bits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Solid-color RGBA buffer
    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat(width as usize * height as usize)
    }

    /// Horizontal gradient, opaque
    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _y in 0..height {
            for x in 0..width {
                let level = (x * 255 / width.max(1)) as u8;
                data.extend_from_slice(&[level, level, level, 255]);
            }
        }
        data
    }

    #[test]
    fn config_defaults_to_16_bit_grid() {
        let config = BlockhashConfig::new();
        assert_eq!(config.grid_bits(), 16);
        assert!(!config.is_quick());
    }

    #[test]
    fn zero_bits_is_rejected() {
        let data = solid(4, 4, [0, 0, 0, 255]);
        let view = PixelView::new(4, 4, &data).unwrap();
        let result = hash_pixels(view, &BlockhashConfig::new().bits(0));
        assert!(matches!(result, Err(HashError::InvalidGridSize { bits: 0 })));
    }

    #[test]
    fn odd_grid_is_rejected() {
        // 3*3 = 9 bits cannot pack into whole nibbles
        let data = solid(9, 9, [0, 0, 0, 255]);
        let view = PixelView::new(9, 9, &data).unwrap();
        let result = hash_pixels(view, &BlockhashConfig::new().bits(3));
        assert!(matches!(result, Err(HashError::InvalidGridSize { bits: 3 })));
    }

    #[test]
    fn zero_width_is_rejected() {
        let result = PixelView::new(0, 10, &[]);
        assert!(matches!(result, Err(HashError::EmptyImage { .. })));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let data = vec![0u8; 10];
        let result = PixelView::new(4, 4, &data);
        assert!(matches!(
            result,
            Err(HashError::BufferSizeMismatch {
                expected: 64,
                actual: 10,
                ..
            })
        ));
    }

    #[test]
    fn forced_quick_on_tiny_image_is_rejected() {
        let data = solid(8, 8, [255, 255, 255, 255]);
        let view = PixelView::new(8, 8, &data).unwrap();
        let result = hash_pixels(view, &BlockhashConfig::new().quick(true));
        assert!(matches!(result, Err(HashError::BlockTooSmall { .. })));
    }

    #[test]
    fn solid_white_hashes_to_all_ones() {
        let data = solid(48, 48, [255, 255, 255, 255]);
        let view = PixelView::new(48, 48, &data).unwrap();
        let fingerprint = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        assert_eq!(fingerprint.to_hex(), "f".repeat(64));
    }

    #[test]
    fn solid_black_hashes_to_all_zeros() {
        let data = solid(48, 48, [0, 0, 0, 255]);
        let view = PixelView::new(48, 48, &data).unwrap();
        let fingerprint = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        assert_eq!(fingerprint.to_hex(), "0".repeat(64));
    }

    #[test]
    fn transparent_image_hashes_like_white() {
        let clear = solid(48, 48, [0, 0, 0, 0]);
        let white = solid(48, 48, [255, 255, 255, 255]);
        let clear_print = hash_pixels(
            PixelView::new(48, 48, &clear).unwrap(),
            &BlockhashConfig::new(),
        )
        .unwrap();
        let white_print = hash_pixels(
            PixelView::new(48, 48, &white).unwrap(),
            &BlockhashConfig::new(),
        )
        .unwrap();
        assert_eq!(clear_print, white_print);
    }

    #[test]
    fn half_black_half_white_splits_predictably() {
        // Left 32 columns black, right 32 white, 64x64: each block row is
        // 8 dark blocks then 8 bright ones, so every row packs to 00ff.
        let mut data = Vec::new();
        for _y in 0..64u32 {
            for x in 0..64u32 {
                let level = if x < 32 { 0 } else { 255 };
                data.extend_from_slice(&[level, level, level, 255]);
            }
        }
        let view = PixelView::new(64, 64, &data).unwrap();
        let fingerprint = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        assert_eq!(fingerprint.to_hex(), "00ff".repeat(16));
    }

    #[test]
    fn single_pixel_image_hashes() {
        // One white pixel lands entirely in block (0,0); the first band's
        // median is 0, so only that block crosses it.
        let data = solid(1, 1, [255, 255, 255, 255]);
        let view = PixelView::new(1, 1, &data).unwrap();
        let fingerprint = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        let expected = format!("8{}", "0".repeat(63));
        assert_eq!(fingerprint.to_hex(), expected);
    }

    #[test]
    fn fingerprint_is_64_bytes_for_any_dimensions() {
        for (width, height) in [(16, 16), (100, 100), (37, 53), (1, 1), (640, 479)] {
            let data = gradient(width, height);
            let view = PixelView::new(width, height, &data).unwrap();
            let fingerprint = hash_pixels(view, &BlockhashConfig::new()).unwrap();
            assert_eq!(fingerprint.as_bytes().len(), 64, "{}x{}", width, height);
        }
    }

    #[test]
    fn hashing_is_deterministic() {
        let data = gradient(100, 75);
        let view = PixelView::new(100, 75, &data).unwrap();
        let first = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        let second = hash_pixels(view, &BlockhashConfig::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn weighted_and_exact_paths_agree_on_divisible_dimensions() {
        let data = gradient(64, 48);
        let view = PixelView::new(64, 48, &data).unwrap();
        let config = BlockhashConfig::new();

        let exact = hash_pixels(view, &config).unwrap();

        let grid = aggregate::aggregate_weighted(view, config.grid_bits());
        let bits = quantize::quantize(&grid);
        let weighted = Fingerprint::from_nibbles(pack::pack_nibbles(&bits));

        assert_eq!(exact, weighted);
    }

    #[test]
    fn from_hex_round_trips() {
        let fingerprint = Fingerprint::from_hex("deadbeef").unwrap();
        assert_eq!(fingerprint.as_bytes(), &[0xd, 0xe, 0xa, 0xd, 0xb, 0xe, 0xe, 0xf]);
        assert_eq!(fingerprint.to_hex(), "deadbeef");
        assert_eq!(fingerprint.bit_count(), 32);
    }

    #[test]
    fn from_hex_rejects_non_hex_characters() {
        let result = Fingerprint::from_hex("dead?eef");
        assert!(matches!(
            result,
            Err(CompareError::InvalidHex {
                character: '?',
                position: 4
            })
        ));
    }

    #[test]
    fn display_matches_hex() {
        let fingerprint = Fingerprint::from_hex("0f0f").unwrap();
        assert_eq!(fingerprint.to_string(), "0f0f");
    }
}
