//! # Decode Module
//!
//! Turns encoded image bytes into the row-major RGBA buffer the hashing
//! core consumes. The core itself never parses a container format.
//!
//! ## Decoders
//! - **JPEG**: zune-jpeg (1.5-2x faster than the image crate), asked to
//!   emit RGBA directly
//! - **Everything else**: image crate fallback, normalized to RGBA
//!
//! Files of 1MB and above are memory-mapped instead of read into a fresh
//! allocation.

use crate::core::blockhash::PixelView;
use crate::error::{DecodeError, HashError};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// A decoded image: owned row-major RGBA pixels.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap an already-decoded RGBA buffer, validating its dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HashError> {
        PixelView::new(width, height, &data)?;
        Ok(Self {
            width,
            height,
            data,
        })
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
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the pixels in the form the hashing core takes.
    pub fn view(&self) -> PixelView<'_> {
        PixelView::from_validated(self.width, self.height, &self.data)
    }
}

/// Container formats recognized from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Jpeg,
    Png,
    Other,
}

impl SniffedFormat {
    /// Detect the container from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }

        Self::Other
    }
}

/// Decode encoded image bytes with the fastest decoder available for the
/// container.
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    match SniffedFormat::sniff(bytes) {
        SniffedFormat::Jpeg => decode_jpeg(bytes).or_else(|_| decode_fallback(bytes)),
        _ => decode_fallback(bytes),
    }
}

/// Read a file and decode it.
pub fn decode_file(path: &Path) -> Result<PixelBuffer, DecodeError> {
    let bytes = read_file_bytes(path)?;
    decode_bytes(&bytes)
}

/// Fast JPEG decoding using zune-jpeg
fn decode_jpeg(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    // Ask the decoder for RGBA so no conversion pass is needed
    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);

    let pixels = decoder.decode().map_err(|e| DecodeError::Malformed {
        reason: format!("zune-jpeg decode failed: {:?}", e),
    })?;

    let info = decoder.info().ok_or_else(|| DecodeError::Malformed {
        reason: "Failed to get image info".to_string(),
    })?;

    if decoder.get_output_colorspace() != Some(ColorSpace::RGBA) {
        // Exotic colorspace; let the image crate normalize it
        return decode_fallback(bytes);
    }

    PixelBuffer::from_rgba(info.width as u32, info.height as u32, pixels)
        .map_err(|e| DecodeError::Malformed {
            reason: e.to_string(),
        })
}

/// Fallback to the image crate for non-JPEG containers
fn decode_fallback(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let image = image::load_from_memory(bytes).map_err(|e| DecodeError::Malformed {
        reason: e.to_string(),
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    PixelBuffer::from_rgba(width, height, rgba.into_raw()).map_err(|e| DecodeError::Malformed {
        reason: e.to_string(),
    })
}

/// File bytes that may be either owned or memory-mapped.
pub enum FileBytes {
    /// Standard heap-allocated bytes
    Vec(Vec<u8>),
    /// Memory-mapped bytes (zero-copy from disk)
    Mmap(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

/// Read file bytes, memory-mapping large files.
///
/// For files >= 1MB, mapping avoids copying data from kernel to user
/// space. Smaller files use a plain read, which has lower overhead.
pub fn read_file_bytes(path: &Path) -> Result<FileBytes, DecodeError> {
    let metadata = std::fs::metadata(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() >= MMAP_THRESHOLD {
        tracing::debug!(path = %path.display(), "memory-mapping large file");
        let file = File::open(path).map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        // SAFETY: the mapping is read-only and the file handle lives as
        // long as the map.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(FileBytes::Mmap(mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(FileBytes::Vec(bytes))
    }
}
