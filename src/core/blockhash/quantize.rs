//! Quantization: turns block intensity sums into fingerprint bits.
//!
//! The flattened grid is split into 4 contiguous equal bands and each
//! band is thresholded at its own median, so a dark quarter of the
//! sequence still contributes contrast instead of being drowned out by a
//! bright one.

use super::aggregate::BlockGrid;

/// Binarize the grid in raster order.
///
/// A value within 1.0 of its band median still counts as set when the
/// median itself exceeds half the maximum block value. The rule is
/// deliberately one-directional (ties only ever become 1) and must stay
/// that way: stored fingerprints depend on it.
pub(super) fn quantize(grid: &BlockGrid) -> Vec<u8> {
    let half_block_value = grid.pixels_per_block * 256.0 * 3.0 / 2.0;
    let bandsize = grid.values.len() / 4;
    let mut bits = Vec::with_capacity(grid.values.len());

    for band in grid.values.chunks(bandsize) {
        let m = median(band);
        for &v in band {
            let bit = v > m || ((v - m).abs() < 1.0 && m > half_block_value);
            bits.push(bit as u8);
        }
    }

    bits
}

/// Statistical median: middle value, or the mean of the two middle values
/// for even lengths.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
