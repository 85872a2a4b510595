//! Block aggregation: reduces an RGBA image to a bits x bits grid of
//! per-block intensity sums.
//!
//! Two paths produce the grid. The exact-division path partitions the
//! image into equal rectangles and is used whenever both dimensions
//! divide evenly by the grid size (or the caller forces it). The
//! weighted path splits each pixel's intensity across up to four
//! neighboring blocks with bilinear weights and handles every other
//! geometry.
//!
//! Both paths are parallelized with rayon. Work is split along fixed
//! boundaries and partial sums are merged in a fixed order, so per-block
//! floating-point accumulation order never depends on scheduling and the
//! resulting fingerprint is byte-identical across runs.

use super::{BlockhashConfig, PixelView};
use crate::error::HashError;
use rayon::prelude::*;

/// Intensity of a fully transparent pixel: the maximum R+G+B sum, so
/// transparency reads as blank-white.
const BLANK_VALUE: f64 = 765.0;

/// Rows per weighted-path work unit. Fixed so the partial-grid merge
/// order is independent of thread count.
const CHUNK_ROWS: usize = 64;

/// Grid of per-block intensity sums plus the effective pixel count per
/// block. Scratch data: lives only for the duration of one hash.
pub(super) struct BlockGrid {
    pub(super) values: Vec<f64>,
    pub(super) pixels_per_block: f64,
}

/// Per-pixel intensity with the transparency fallback.
#[inline]
fn intensity(pixel: &[u8]) -> f64 {
    if pixel[3] == 0 {
        BLANK_VALUE
    } else {
        (pixel[0] as u32 + pixel[1] as u32 + pixel[2] as u32) as f64
    }
}

/// Reduce an image to its block grid, selecting the aggregation path.
pub(super) fn aggregate(
    image: PixelView<'_>,
    config: &BlockhashConfig,
) -> Result<BlockGrid, HashError> {
    let bits = config.grid_bits();
    let divides_evenly = image.width() % bits == 0 && image.height() % bits == 0;

    if config.is_quick() || divides_evenly {
        aggregate_exact(image, bits)
    } else {
        Ok(aggregate_weighted(image, bits))
    }
}

/// Exact-division path: non-overlapping rectangles, plain sums.
pub(super) fn aggregate_exact(image: PixelView<'_>, bits: u32) -> Result<BlockGrid, HashError> {
    let block_width = (image.width() / bits) as usize;
    let block_height = (image.height() / bits) as usize;
    if block_width == 0 || block_height == 0 {
        return Err(HashError::BlockTooSmall {
            width: image.width(),
            height: image.height(),
            bits,
        });
    }

    let width = image.width() as usize;
    let bits = bits as usize;
    let data = image.data();

    // Blocks are disjoint, so each one sums its own rectangle; row-major
    // order within a block keeps the summation order fixed.
    let values: Vec<f64> = (0..bits * bits)
        .into_par_iter()
        .map(|index| {
            let block_x = (index % bits) * block_width;
            let block_y = (index / bits) * block_height;
            let mut sum = 0.0;
            for row in 0..block_height {
                let base = ((block_y + row) * width + block_x) * 4;
                for col in 0..block_width {
                    sum += intensity(&data[base + col * 4..base + col * 4 + 4]);
                }
            }
            sum
        })
        .collect();

    Ok(BlockGrid {
        values,
        pixels_per_block: (block_width * block_height) as f64,
    })
}

/// Weighted path: each pixel contributes to up to four blocks with
/// bilinear weights along each axis.
pub(super) fn aggregate_weighted(image: PixelView<'_>, bits: u32) -> BlockGrid {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let block_width = image.width() as f64 / bits as f64;
    let block_height = image.height() as f64 / bits as f64;
    let bits = bits as usize;
    let data = image.data();

    // Each worker accumulates a private grid over a fixed row range; the
    // partial grids are summed in chunk order afterwards.
    let chunk_starts: Vec<usize> = (0..height).step_by(CHUNK_ROWS).collect();
    let partials: Vec<Vec<f64>> = chunk_starts
        .par_iter()
        .map(|&start| {
            let end = (start + CHUNK_ROWS).min(height);
            let mut blocks = vec![0.0f64; bits * bits];
            for y in start..end {
                accumulate_row(
                    data,
                    width,
                    height,
                    y,
                    bits,
                    block_width,
                    block_height,
                    &mut blocks,
                );
            }
            blocks
        })
        .collect();

    let mut values = vec![0.0f64; bits * bits];
    for partial in &partials {
        for (value, part) in values.iter_mut().zip(partial) {
            *value += *part;
        }
    }

    BlockGrid {
        values,
        pixels_per_block: block_width * block_height,
    }
}

/// Distribute one row of pixels into the grid.
#[allow(clippy::too_many_arguments)]
fn accumulate_row(
    data: &[u8],
    width: usize,
    height: usize,
    y: usize,
    bits: usize,
    block_width: f64,
    block_height: f64,
    blocks: &mut [f64],
) {
    let y_mod = (y as f64 + 1.0) % block_height;
    let y_frac = y_mod.fract();
    let y_int = y_mod - y_frac;

    let weight_top = 1.0 - y_frac;
    let weight_bottom = y_frac;

    // A pixel exactly on a block boundary, or in the final image row,
    // belongs wholly to one block row; splitting there would index past
    // the grid.
    let (block_top, block_bottom) = if y_int > 0.0 || y + 1 == height {
        let row = (y as f64 / block_height).floor() as usize;
        (row, row)
    } else {
        (
            (y as f64 / block_height).floor() as usize,
            (y as f64 / block_height).ceil() as usize,
        )
    };

    for x in 0..width {
        let x_mod = (x as f64 + 1.0) % block_width;
        let x_frac = x_mod.fract();
        let x_int = x_mod - x_frac;

        let weight_left = 1.0 - x_frac;
        let weight_right = x_frac;

        let (block_left, block_right) = if x_int > 0.0 || x + 1 == width {
            let col = (x as f64 / block_width).floor() as usize;
            (col, col)
        } else {
            (
                (x as f64 / block_width).floor() as usize,
                (x as f64 / block_width).ceil() as usize,
            )
        };

        let value = intensity(&data[(y * width + x) * 4..(y * width + x) * 4 + 4]);

        blocks[block_top * bits + block_left] += value * weight_top * weight_left;
        blocks[block_top * bits + block_right] += value * weight_top * weight_right;
        blocks[block_bottom * bits + block_left] += value * weight_bottom * weight_left;
        blocks[block_bottom * bits + block_right] += value * weight_bottom * weight_right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat(width as usize * height as usize)
    }

    #[test]
    fn exact_path_sums_uniform_blocks() {
        // 32x32 mid-gray, 16x16 grid: every block is 2x2 pixels of 384
        let data = solid(32, 32, [128, 128, 128, 255]);
        let view = PixelView::new(32, 32, &data).unwrap();
        let grid = aggregate_exact(view, 16).unwrap();

        assert_eq!(grid.values.len(), 256);
        assert_eq!(grid.pixels_per_block, 4.0);
        assert!(grid.values.iter().all(|&v| v == 4.0 * 384.0));
    }

    #[test]
    fn transparent_pixels_count_as_blank() {
        let data = solid(16, 16, [0, 0, 0, 0]);
        let view = PixelView::new(16, 16, &data).unwrap();
        let grid = aggregate_exact(view, 16).unwrap();
        assert!(grid.values.iter().all(|&v| v == BLANK_VALUE));
    }

    #[test]
    fn weighted_path_conserves_total_intensity() {
        // Weights along each axis sum to 1 per pixel, so the grid total
        // must equal the plain pixel total.
        let width = 50u32;
        let height = 37u32;
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let level = ((x * 7 + y * 13) % 256) as u8;
                data.extend_from_slice(&[level, level, level, 255]);
            }
        }
        let view = PixelView::new(width, height, &data).unwrap();
        let grid = aggregate_weighted(view, 16);

        let grid_total: f64 = grid.values.iter().sum();
        let pixel_total: f64 = data.chunks_exact(4).map(intensity).sum();
        assert!((grid_total - pixel_total).abs() < 1e-6 * pixel_total.max(1.0));
    }

    #[test]
    fn weighted_path_matches_exact_on_divisible_dimensions() {
        let mut data = Vec::new();
        for y in 0..48u32 {
            for x in 0..64u32 {
                let level = ((x * 3 + y * 5) % 256) as u8;
                data.extend_from_slice(&[level, level, level, 255]);
            }
        }
        let view = PixelView::new(64, 48, &data).unwrap();

        let exact = aggregate_exact(view, 16).unwrap();
        let weighted = aggregate_weighted(view, 16);

        // On even divisions every weight collapses to 0 or 1 and both
        // paths sum whole intensities, which f64 represents exactly.
        assert_eq!(exact.values, weighted.values);
        assert_eq!(exact.pixels_per_block, weighted.pixels_per_block);
    }

    #[test]
    fn exact_path_rejects_subpixel_blocks() {
        let data = solid(8, 8, [255, 255, 255, 255]);
        let view = PixelView::new(8, 8, &data).unwrap();
        assert!(matches!(
            aggregate_exact(view, 16),
            Err(HashError::BlockTooSmall { .. })
        ));
    }

    #[test]
    fn weighted_path_handles_images_narrower_than_grid() {
        let data = solid(5, 3, [255, 255, 255, 255]);
        let view = PixelView::new(5, 3, &data).unwrap();
        let grid = aggregate_weighted(view, 16);
        assert_eq!(grid.values.len(), 256);
        let total: f64 = grid.values.iter().sum();
        assert!((total - 15.0 * 765.0).abs() < 1e-9);
    }
}
