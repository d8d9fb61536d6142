//! # Image Quality Assessment Module
//!
//! This module measures contrast, brightness and sharpness of an image's luminance
//! and decides whether the image needs enhancement before text extraction. All
//! measurements are closed-form statistics over the pixel data.

use image::{DynamicImage, GrayImage};

use super::input::validate_image;
use super::types::QualityMetrics;
use crate::config::QualityThresholds;
use crate::errors::EnhancementResult;

/// Assesses the quality of an image against the configured thresholds.
///
/// Degenerate but well-formed images (flat colour, pure noise, fully saturated)
/// are measured normally: a flat image has contrast 0 and sharpness 0 and is
/// therefore reported as needing enhancement.
///
/// # Arguments
///
/// * `image` - The input image, 8-bit gray or 8-bit RGB
/// * `thresholds` - Acceptable bands for each metric
///
/// # Returns
///
/// Returns a `Result` containing the quality metrics, or
/// `EnhancementError::InvalidInput` for empty or unsupported images
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, Luma};
/// use shelf_enhancer::config::QualityThresholds;
/// use shelf_enhancer::preprocessing::assess_image_quality;
///
/// let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([128])));
/// let metrics = assess_image_quality(&flat, &QualityThresholds::default()).unwrap();
/// assert_eq!(metrics.contrast, 0.0);
/// assert!(metrics.needs_enhancement);
/// ```
pub fn assess_image_quality(
    image: &DynamicImage,
    thresholds: &QualityThresholds,
) -> EnhancementResult<QualityMetrics> {
    validate_image(image)?;

    // Perceptual luma for analysis
    let gray = image.to_luma8();

    let (brightness, contrast) = calculate_mean_and_std(&gray);
    let sharpness = calculate_sharpness(&gray);
    let needs_enhancement = needs_enhancement(contrast, brightness, sharpness, thresholds);

    tracing::debug!(
        target: "image_enhancement",
        contrast,
        brightness,
        sharpness,
        needs_enhancement,
        "Quality assessment completed"
    );

    Ok(QualityMetrics {
        contrast,
        brightness,
        sharpness,
        needs_enhancement,
    })
}

/// True iff any metric falls outside its acceptable band.
pub fn needs_enhancement(
    contrast: f64,
    brightness: f64,
    sharpness: f64,
    thresholds: &QualityThresholds,
) -> bool {
    contrast <= thresholds.contrast_min
        || brightness < thresholds.brightness_min
        || brightness > thresholds.brightness_max
        || sharpness <= thresholds.sharpness_min
}

/// Mean and population standard deviation of the luminance samples.
fn calculate_mean_and_std(image: &GrayImage) -> (f64, f64) {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return (0.0, 0.0);
    }

    let n = total as f64;
    let mean = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum::<f64>()
        / n;

    let variance = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| {
            let d = value as f64 - mean;
            d * d * count as f64
        })
        .sum::<f64>()
        / n;

    (mean, variance.sqrt())
}

/// Reflect-101 border index (`gfedcb|abcdefgh|gfedcba`). Falls back to edge
/// replication when the axis is a single pixel long.
#[inline]
pub(super) fn reflect_101(index: i64, len: i64) -> u32 {
    if len == 1 {
        return 0;
    }
    let i = if index < 0 {
        -index
    } else if index >= len {
        2 * len - 2 - index
    } else {
        index
    };
    i as u32
}

/// Variance of the 4-neighbour Laplacian `[[0,1,0],[1,-4,1],[0,1,0]]` over every pixel.
fn calculate_sharpness(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    let (w, h) = (width as i64, height as i64);
    let total = w * h;
    if total == 0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| image.get_pixel(reflect_101(x, w), reflect_101(y, h))[0] as f64;

    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for y in 0..h {
        for x in 0..w {
            let response =
                at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let n = total as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}
