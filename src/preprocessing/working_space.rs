//! # Luminance Working Space
//!
//! A reversible split of an image into a luminance plane and untouched chroma.
//! The contrast enhancer only ever sees the luminance plane, so it cannot shift hue.
//!
//! - Gray images: the luminance plane is the image itself.
//! - RGB images: sRGB (D65) is converted to CIE L\*a\*b\*. Lightness is quantised to
//!   8 bits (`L * 255 / 100`) for histogram work while a\* and b\* are kept at full
//!   precision and written back unchanged.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::errors::{EnhancementError, EnhancementResult};

/// D65 reference white
const D65_X: f32 = 0.95047;
const D65_Y: f32 = 1.00000;
const D65_Z: f32 = 1.08883;

const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// CIE L\*a\*b\* triple. L in 0..=100, a and b roughly -128..=128.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

#[derive(Debug, Clone)]
struct ChromaPlanes {
    a: Vec<f32>,
    b: Vec<f32>,
}

/// Luminance plane plus whatever is needed to rebuild the original layout.
#[derive(Debug, Clone)]
pub struct WorkingSpace {
    luminance: GrayImage,
    chroma: Option<ChromaPlanes>,
}

impl WorkingSpace {
    /// Splits an image into the working space (`toWorkingSpace`).
    ///
    /// # Errors
    ///
    /// Returns `EnhancementError::EnhancementFailure` for layouts other than 8-bit
    /// gray or 8-bit RGB, since the transform cannot run on them.
    pub fn from_image(image: &DynamicImage) -> EnhancementResult<Self> {
        match image {
            DynamicImage::ImageLuma8(gray) => Ok(Self {
                luminance: gray.clone(),
                chroma: None,
            }),
            DynamicImage::ImageRgb8(rgb) => Ok(Self::from_rgb(rgb)),
            other => Err(EnhancementError::EnhancementFailure(format!(
                "cannot convert {:?} to the luminance working space",
                other.color()
            ))),
        }
    }

    fn from_rgb(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let decode = srgb_decode_table();
        let pixel_count = width as usize * height as usize;

        let mut luminance = GrayImage::new(width, height);
        let mut a = Vec::with_capacity(pixel_count);
        let mut b = Vec::with_capacity(pixel_count);

        for (pixel, out) in rgb.pixels().zip(luminance.pixels_mut()) {
            let [r, g, bl] = pixel.0;
            let lab = linear_rgb_to_lab(
                decode[r as usize],
                decode[g as usize],
                decode[bl as usize],
            );
            *out = Luma([quantize_lightness(lab.l)]);
            a.push(lab.a);
            b.push(lab.b);
        }

        Self {
            luminance,
            chroma: Some(ChromaPlanes { a, b }),
        }
    }

    /// The 8-bit luminance plane the enhancer operates on
    pub fn luminance(&self) -> &GrayImage {
        &self.luminance
    }

    /// Swaps in a processed luminance plane of identical dimensions.
    pub fn replace_luminance(&mut self, plane: GrayImage) -> EnhancementResult<()> {
        if plane.dimensions() != self.luminance.dimensions() {
            return Err(EnhancementError::EnhancementFailure(format!(
                "luminance plane is {:?}, working space expects {:?}",
                plane.dimensions(),
                self.luminance.dimensions()
            )));
        }
        self.luminance = plane;
        Ok(())
    }

    /// Recomposes the original channel layout (`fromWorkingSpace`).
    pub fn into_image(self) -> DynamicImage {
        let Some(chroma) = self.chroma else {
            return DynamicImage::ImageLuma8(self.luminance);
        };

        let (width, height) = self.luminance.dimensions();
        let mut rgb = RgbImage::new(width, height);

        for (i, (l, out)) in self.luminance.pixels().zip(rgb.pixels_mut()).enumerate() {
            let lab = Lab {
                l: l[0] as f32 * 100.0 / 255.0,
                a: chroma.a[i],
                b: chroma.b[i],
            };
            let (r, g, b) = lab_to_linear_rgb(lab);
            *out = Rgb([srgb_encode(r), srgb_encode(g), srgb_encode(b)]);
        }

        DynamicImage::ImageRgb8(rgb)
    }
}

/// Converts one 8-bit sRGB pixel to CIE L\*a\*b\*.
pub fn srgb_to_lab(pixel: [u8; 3]) -> Lab {
    linear_rgb_to_lab(
        srgb_to_linear(pixel[0]),
        srgb_to_linear(pixel[1]),
        srgb_to_linear(pixel[2]),
    )
}

fn srgb_to_linear(value: u8) -> f32 {
    let c = value as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb_decode_table() -> [f32; 256] {
    let mut table = [0.0f32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = srgb_to_linear(i as u8);
    }
    table
}

fn srgb_encode(linear: f32) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let encoded = if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

fn quantize_lightness(l: f32) -> u8 {
    (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn linear_rgb_to_lab(r: f32, g: f32, b: f32) -> Lab {
    let m = &SRGB_TO_XYZ;
    let x = m[0][0] * r + m[0][1] * g + m[0][2] * b;
    let y = m[1][0] * r + m[1][1] * g + m[1][2] * b;
    let z = m[2][0] * r + m[2][1] * g + m[2][2] * b;

    let fx = lab_f(x / D65_X);
    let fy = lab_f(y / D65_Y);
    let fz = lab_f(z / D65_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

fn lab_to_linear_rgb(lab: Lab) -> (f32, f32, f32) {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = lab.a / 500.0 + fy;
    let fz = fy - lab.b / 200.0;

    let x = D65_X * lab_f_inv(fx);
    let y = D65_Y * lab_f_inv(fy);
    let z = D65_Z * lab_f_inv(fz);

    let m = &XYZ_TO_SRGB;
    (
        m[0][0] * x + m[0][1] * y + m[0][2] * z,
        m[1][0] * x + m[1][1] * y + m[1][2] * z,
        m[2][0] * x + m[2][1] * y + m[2][2] * z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_color_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (40 + x * 7 % 180) as u8,
                (60 + y * 5 % 150) as u8,
                (30 + (x + y) * 3 % 200) as u8,
            ])
        })
    }

    #[test]
    fn test_gray_round_trip_is_exact() {
        let gray = GrayImage::from_fn(16, 9, |x, y| Luma([(x * 13 + y * 7) as u8]));
        let image = DynamicImage::ImageLuma8(gray.clone());

        let space = WorkingSpace::from_image(&image).unwrap();
        assert_eq!(space.luminance(), &gray);

        match space.into_image() {
            DynamicImage::ImageLuma8(back) => assert_eq!(back, gray),
            _ => panic!("gray input must come back as gray"),
        }
    }

    #[test]
    fn test_rgb_round_trip_is_close() {
        let rgb = create_color_image(32, 32);
        let space = WorkingSpace::from_image(&DynamicImage::ImageRgb8(rgb.clone())).unwrap();

        let back = space.into_image().to_rgb8();
        for (orig, rebuilt) in rgb.pixels().zip(back.pixels()) {
            for c in 0..3 {
                let diff = (orig[c] as i32 - rebuilt[c] as i32).abs();
                assert!(diff <= 2, "channel drifted by {} ({:?} vs {:?})", diff, orig, rebuilt);
            }
        }
    }

    #[test]
    fn test_known_lab_values() {
        let white = srgb_to_lab([255, 255, 255]);
        assert!((white.l - 100.0).abs() < 0.1);
        assert!(white.a.abs() < 0.1 && white.b.abs() < 0.1);

        let black = srgb_to_lab([0, 0, 0]);
        assert!(black.l.abs() < 0.1);

        let red = srgb_to_lab([255, 0, 0]);
        assert!((red.l - 53.24).abs() < 0.5);
        assert!(red.a > 75.0);
    }

    #[test]
    fn test_unsupported_layout_fails_loudly() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
        assert!(matches!(
            WorkingSpace::from_image(&rgba),
            Err(EnhancementError::EnhancementFailure(_))
        ));
    }

    #[test]
    fn test_replace_luminance_checks_dimensions() {
        let image = DynamicImage::ImageRgb8(create_color_image(8, 8));
        let mut space = WorkingSpace::from_image(&image).unwrap();

        assert!(space.replace_luminance(GrayImage::new(4, 4)).is_err());
        assert!(space.replace_luminance(GrayImage::new(8, 8)).is_ok());
        assert!(space.luminance().pixels().all(|p| p[0] == 0));
    }
}
