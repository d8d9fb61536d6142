//! # Test Helper Library
//!
//! Synthetic image builders shared by the integration tests. Every image is
//! built in memory with known statistics so tests can reason about the
//! expected decision.

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// All samples confined to [100, 110]: flat and soft, so it needs enhancement
pub fn low_contrast_gray(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        Luma([100 + ((x * 7 + y * 13) % 11) as u8])
    }))
}

/// Two halves at 48 and 208, 342 pixels wide.
///
/// Contrast is exactly 80 and brightness exactly 128. Only the two columns
/// touching the edge respond to the Laplacian (±160), so sharpness is
/// `2 * 160² / 342 ≈ 149.7`.
pub fn well_exposed_gray() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(342, 64, |x, _| {
        Luma([if x < 171 { 48 } else { 208 }])
    }))
}

/// Low-contrast colour image with a fixed warm cast (R > G > B)
pub fn low_contrast_color(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let base = 100 + ((x * 7 + y * 13) % 11) as u8;
        Rgb([base + 40, base, base - 20])
    }))
}

pub fn flat_gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Uniform noise over `[low, high]` from a seeded generator
pub fn noise_gray(width: u32, height: u32, low: u8, high: u8, seed: u64) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |_, _| {
        Luma([rng.random_range(low..=high)])
    }))
}

/// Dark scene with faint structure
pub fn dark_gray(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        Luma([5 + ((x / 4 + y / 4) % 6) as u8])
    }))
}

/// Smooth horizontal ramp over the full range
pub fn gradient_gray(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
        Luma([(x * 255 / width.max(2).saturating_sub(1)).min(255) as u8])
    }))
}
