//! Pixel operations: aspect crop and print resize.
//!
//! These functions combine the pure [`calculations`](super::calculations)
//! with the `image` crate's buffer operations. They never mutate their input.

use super::calculations::{CropBox, center_crop_box, print_pixels};
use super::params::PrintImage;
use crate::catalog::SizeSpec;
use image::RgbImage;
use image::imageops::{self, FilterType};

/// Copy out the `crop` region of `image`.
pub fn crop(image: &RgbImage, crop: CropBox) -> RgbImage {
    imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image()
}

/// Center-crop `image` to `target_ratio` (width / height).
pub fn crop_to_ratio(image: &RgbImage, target_ratio: f64) -> RgbImage {
    let crop_box = center_crop_box(image.dimensions(), target_ratio);
    crop(image, crop_box)
}

/// Resample `image` to the exact pixel size of `size` at `dpi`.
///
/// Uses Lanczos3, which is anti-aliased when downscaling and smooth when
/// upscaling. The caller is responsible for cropping to the print's aspect
/// ratio first; this function does not preserve aspect ratio on its own.
pub fn resize_for_print(image: &RgbImage, size: SizeSpec, dpi: u32) -> PrintImage {
    let (width, height) = print_pixels(size, dpi);
    let pixels = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width.max(1), height.max(1), FilterType::Lanczos3)
    };
    PrintImage { pixels, dpi }
}
