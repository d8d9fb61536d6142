//! # Input Boundary
//!
//! Validation of the pixel buffers handed to the engine. The engine works on
//! decoded 8-bit gray or 8-bit RGB images only; decoding and any layout
//! conversion belong to the caller.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::errors::{EnhancementError, EnhancementResult};

/// Builds an image from a raw decoded buffer of `width * height * channels` bytes.
///
/// # Errors
///
/// Returns `EnhancementError::InvalidInput` for zero dimensions, channel counts
/// other than 1 or 3, and buffers whose length does not match the dimensions.
///
/// # Examples
///
/// ```
/// use shelf_enhancer::preprocessing::image_from_raw;
///
/// let image = image_from_raw(2, 1, 3, vec![255, 0, 0, 0, 0, 255]).unwrap();
/// assert_eq!(image.width(), 2);
/// assert!(image_from_raw(0, 1, 3, Vec::new()).is_err());
/// ```
pub fn image_from_raw(
    width: u32,
    height: u32,
    channels: u8,
    bytes: Vec<u8>,
) -> EnhancementResult<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(EnhancementError::InvalidInput(format!(
            "image has zero dimension ({}x{})",
            width, height
        )));
    }

    let expected = width as u64 * height as u64 * channels as u64;
    if bytes.len() as u64 != expected {
        return Err(EnhancementError::InvalidInput(format!(
            "pixel buffer holds {} bytes, expected {} for {}x{}x{}",
            bytes.len(),
            expected,
            width,
            height,
            channels
        )));
    }

    let image = match channels {
        1 => GrayImage::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8),
        other => {
            return Err(EnhancementError::InvalidInput(format!(
                "unsupported channel count {}: expected 1 (gray) or 3 (RGB)",
                other
            )))
        }
    };

    image.ok_or_else(|| {
        EnhancementError::InvalidInput("pixel buffer does not match its dimensions".to_string())
    })
}

/// Rejects images the engine cannot measure: empty images and layouts other than
/// 8-bit gray or 8-bit RGB.
pub fn validate_image(image: &DynamicImage) -> EnhancementResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EnhancementError::InvalidInput(format!(
            "image has zero dimension ({}x{})",
            image.width(),
            image.height()
        )));
    }

    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Ok(()),
        other => Err(EnhancementError::InvalidInput(format!(
            "unsupported pixel layout {:?}: expected 8-bit gray or 8-bit RGB",
            other.color()
        ))),
    }
}
