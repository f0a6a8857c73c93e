//! Image preprocessing variants for OCR
//!
//! Each variant is a deterministic filter producing one grayscale image.
//! Running OCR over several variants of the same photo recovers text that a
//! single filter would lose to glare, low contrast or print noise.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::{contrast, filter, morphology};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neighbourhood radius for adaptive thresholding (11x11 block)
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;
/// Offset subtracted from the local mean before comparing
const ADAPTIVE_OFFSET: i16 = 2;

/// One preprocessing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Luminance only
    Grayscale,
    /// Global threshold at the Otsu level
    Binary,
    /// Threshold against the local mean
    Adaptive,
    /// Otsu binary followed by a 3x3 morphological close
    MorphClose,
    /// 3x3 median filter over the grayscale image
    Denoise,
}

impl Variant {
    /// Every variant in default order
    pub const ALL: [Variant; 5] = [
        Variant::Grayscale,
        Variant::Binary,
        Variant::Adaptive,
        Variant::MorphClose,
        Variant::Denoise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Grayscale => "grayscale",
            Variant::Binary => "binary",
            Variant::Adaptive => "adaptive",
            Variant::MorphClose => "morph_close",
            Variant::Denoise => "denoise",
        }
    }

    /// Produce this variant of an image
    pub fn apply(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        debug!(
            "Generating {} variant ({}x{})",
            self.name(),
            gray.width(),
            gray.height()
        );

        match self {
            Variant::Grayscale => gray,
            Variant::Binary => apply_otsu(&gray),
            Variant::Adaptive => apply_adaptive(&gray, ADAPTIVE_BLOCK_RADIUS, ADAPTIVE_OFFSET),
            Variant::MorphClose => morphology::close(&apply_otsu(&gray), Norm::LInf, 1),
            Variant::Denoise => filter::median_filter(&gray, 1, 1),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binarize at the Otsu level: pixels above the level become white
fn apply_otsu(gray: &GrayImage) -> GrayImage {
    let level = contrast::otsu_level(gray);
    apply_threshold(gray, level)
}

/// Binarize at a fixed level
fn apply_threshold(gray: &GrayImage, level: u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] > level { 255 } else { 0 };
    }
    out
}

/// Binarize each pixel against the mean of its neighbourhood minus an offset
fn apply_adaptive(gray: &GrayImage, block_radius: u32, offset: i16) -> GrayImage {
    let local_mean = filter::box_filter(gray, block_radius, block_radius);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i16;
        let mean = local_mean.get_pixel(x, y)[0] as i16;
        if value > mean - offset {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// Dark text-like bar on a light background
    fn sample_image() -> DynamicImage {
        let img = RgbImage::from_fn(20, 10, |x, _| {
            if (5..15).contains(&x) {
                image::Rgb([20, 20, 20])
            } else {
                image::Rgb([230, 230, 230])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_every_variant_keeps_dimensions() {
        let image = sample_image();
        for variant in Variant::ALL {
            let out = variant.apply(&image);
            assert_eq!(out.dimensions(), (20, 10), "{} changed size", variant);
        }
    }

    #[test]
    fn test_grayscale() {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        let out = Variant::Grayscale.apply(&DynamicImage::ImageRgb8(img));
        // Red luminance lands well below mid-gray
        assert!(out.get_pixel(0, 0)[0] < 128);
    }

    #[test]
    fn test_binary_output_is_two_level() {
        let out = Variant::Binary.apply(&sample_image());
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(10, 5)[0], 0);
        assert_eq!(out.get_pixel(1, 5)[0], 255);
    }

    #[test]
    fn test_threshold() {
        let gray = GrayImage::from_raw(3, 1, vec![10, 100, 200]).unwrap();
        let out = apply_threshold(&gray, 100);
        assert_eq!(out.into_raw(), vec![0, 0, 255]);
    }

    #[test]
    fn test_adaptive_uniform_is_white() {
        let gray = GrayImage::from_pixel(8, 8, Luma([90]));
        let out = apply_adaptive(&gray, 2, 2);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_variant_is_deterministic() {
        let image = sample_image();
        for variant in Variant::ALL {
            assert_eq!(variant.apply(&image), variant.apply(&image));
        }
    }

    #[test]
    fn test_variant_serde_names() {
        let json = serde_json::to_string(&Variant::MorphClose).unwrap();
        assert_eq!(json, "\"morph_close\"");
    }
}
