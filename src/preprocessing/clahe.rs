//! # Contrast Limited Adaptive Histogram Equalization
//!
//! Local contrast enhancement restricted to the luminance working space. The
//! luminance plane is divided into a grid of contextual regions; each region gets a
//! clipped-histogram equalization mapping, and every pixel blends the mappings of
//! the four nearest region centres bilinearly so no tile seams appear.

use std::time::Instant;

use image::{DynamicImage, GrayImage};

use super::quality::reflect_101;
use super::types::ClaheImageResult;
use super::working_space::WorkingSpace;
use crate::config::{EnhancementParameters, TileGrid};
use crate::errors::{EnhancementError, EnhancementResult};

const HIST_SIZE: usize = 256;

/// Applies CLAHE to the luminance of an image, leaving chroma untouched.
///
/// # Arguments
///
/// * `image` - The input image, 8-bit gray or 8-bit RGB
/// * `params` - Clip limit and tile grid
///
/// # Returns
///
/// Returns a `Result` containing the enhanced image (same layout and dimensions as
/// the input) and the parameters used
///
/// # Errors
///
/// * `EnhancementError::Configuration` for an invalid clip limit or tile grid
/// * `EnhancementError::InvalidInput` for a zero-dimension image
/// * `EnhancementError::EnhancementFailure` when the layout cannot be converted
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, Luma};
/// use shelf_enhancer::config::EnhancementParameters;
/// use shelf_enhancer::preprocessing::apply_clahe;
///
/// let img = DynamicImage::ImageLuma8(GrayImage::from_fn(64, 64, |x, y| {
///     Luma([100 + ((x * 7 + y * 3) % 11) as u8])
/// }));
/// let enhanced = apply_clahe(&img, &EnhancementParameters::default()).unwrap();
/// assert_eq!(enhanced.image.width(), 64);
/// ```
pub fn apply_clahe(
    image: &DynamicImage,
    params: &EnhancementParameters,
) -> EnhancementResult<ClaheImageResult> {
    let start_time = Instant::now();

    params.validate()?;

    if image.width() == 0 || image.height() == 0 {
        return Err(EnhancementError::InvalidInput(format!(
            "cannot enhance a {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let mut space = WorkingSpace::from_image(image)?;
    let equalized = equalize_luminance(space.luminance(), params.clip_limit, params.tile_grid);
    space.replace_luminance(equalized)?;
    let enhanced = space.into_image();

    let processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    tracing::debug!(
        target: "image_enhancement",
        clip_limit = params.clip_limit,
        tile_grid = %params.tile_grid,
        width = enhanced.width(),
        height = enhanced.height(),
        processing_time_ms,
        "CLAHE applied"
    );

    Ok(ClaheImageResult {
        image: enhanced,
        clip_limit: params.clip_limit,
        tile_grid: params.tile_grid,
        processing_time_ms,
    })
}

/// Runs CLAHE on a single 8-bit plane.
///
/// The effective grid shrinks to the plane size when the plane has fewer pixels
/// than tiles along an axis. Tiles are `ceil(len / tiles)` pixels long and the
/// plane is virtually extended with reflect-101 borders, so every tile histogram
/// covers the same area.
pub fn equalize_luminance(plane: &GrayImage, clip_limit: f64, grid: TileGrid) -> GrayImage {
    let (width, height) = plane.dimensions();
    if width == 0 || height == 0 {
        return plane.clone();
    }

    let tiles_x = (grid.cols.max(1)).min(width) as usize;
    let tiles_y = (grid.rows.max(1)).min(height) as usize;
    let (w, h) = (width as usize, height as usize);
    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let area = (tile_w * tile_h) as u32;
    let src: &[u8] = plane;

    // 1. Clipped histogram mapping for every contextual region
    let mut luts = vec![[0u8; HIST_SIZE]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut histogram = [0u32; HIST_SIZE];
            for py in ty * tile_h..(ty + 1) * tile_h {
                let row = reflect_101(py as i64, h as i64) as usize * w;
                for px in tx * tile_w..(tx + 1) * tile_w {
                    let col = reflect_101(px as i64, w as i64) as usize;
                    histogram[src[row + col] as usize] += 1;
                }
            }

            luts[ty * tiles_x + tx] = build_tile_lut(&mut histogram, area, clip_limit);
        }
    }

    // 2. Bilinear blend of the four surrounding mappings
    let columns = interpolation_axis(w, tiles_x, tile_w);
    let rows = interpolation_axis(h, tiles_y, tile_h);

    let mut output = GrayImage::new(width, height);
    let dst: &mut [u8] = &mut output;

    for (y, &(ty1, ty2, py)) in rows.iter().enumerate() {
        let top = &luts[ty1 * tiles_x..(ty1 + 1) * tiles_x];
        let bottom = &luts[ty2 * tiles_x..(ty2 + 1) * tiles_x];
        let row_offset = y * w;

        for (x, &(tx1, tx2, px)) in columns.iter().enumerate() {
            let value = src[row_offset + x] as usize;

            let upper = top[tx1][value] as f32 * (1.0 - px) + top[tx2][value] as f32 * px;
            let lower = bottom[tx1][value] as f32 * (1.0 - px) + bottom[tx2][value] as f32 * px;
            let blended = upper * (1.0 - py) + lower * py;

            dst[row_offset + x] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }

    output
}

/// Clips the histogram, redistributes the excess and returns the equalization mapping.
fn build_tile_lut(histogram: &mut [u32; HIST_SIZE], area: u32, clip_limit: f64) -> [u8; HIST_SIZE] {
    let mut lut = [0u8; HIST_SIZE];
    if area == 0 {
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = i as u8;
        }
        return lut;
    }

    let clip = ((clip_limit * area as f64 / HIST_SIZE as f64) as u32).max(1);

    let mut excess = 0u32;
    for count in histogram.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }

    let uniform_increment = excess / HIST_SIZE as u32;
    let mut residual = excess % HIST_SIZE as u32;
    for count in histogram.iter_mut() {
        *count += uniform_increment;
    }

    if residual > 0 {
        let step = (HIST_SIZE / residual as usize).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            histogram[i] += 1;
            residual -= 1;
            i += step;
        }
    }

    let scale = (HIST_SIZE - 1) as f64 / area as f64;
    let mut cumulative = 0u64;
    for (count, entry) in histogram.iter().zip(lut.iter_mut()) {
        cumulative += *count as u64;
        *entry = (cumulative as f64 * scale).round().min(255.0) as u8;
    }

    lut
}

/// For each coordinate: the two neighbouring region indices and the blend weight
/// of the second one. Region centres sit at `(i + 0.5) * tile_size`.
fn interpolation_axis(len: usize, tiles: usize, tile_size: usize) -> Vec<(usize, usize, f32)> {
    let inv_tile = 1.0 / tile_size as f32;
    let last = tiles as i64 - 1;

    (0..len)
        .map(|i| {
            let position = i as f32 * inv_tile - 0.5;
            let first = position.floor();
            let weight = position - first;
            let t1 = (first as i64).clamp(0, last) as usize;
            let t2 = (first as i64 + 1).clamp(0, last) as usize;
            (t1, t2, weight)
        })
        .collect()
}
