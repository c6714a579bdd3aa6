//! Pure calculation functions for crop and print geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Pixel counts are always floored, never rounded, so a print never claims
//! more pixels than the source region actually supplies.

use crate::catalog::SizeSpec;

/// A crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropBox {
    /// `[left, top, right, bottom]`, right and bottom exclusive.
    pub fn bounds(&self) -> [u32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// Center-crop box that gives `source` the `target_ratio` (width / height).
///
/// A source wider than the target keeps its full height and loses equal
/// margins left and right; otherwise it keeps its full width and loses equal
/// margins top and bottom.
///
/// A source with a zero dimension yields a box with that dimension still
/// zero; callers reject such images before rendering.
///
/// # Examples
/// ```
/// # use printcrop::imaging::calculations::{CropBox, center_crop_box};
/// // 900x600 landscape to 2:3 portrait: keep height, width = floor(600 * 2/3) = 400
/// let crop = center_crop_box((900, 600), 2.0 / 3.0);
/// assert_eq!(crop, CropBox { x: 250, y: 0, width: 400, height: 600 });
/// ```
pub fn center_crop_box(source: (u32, u32), target_ratio: f64) -> CropBox {
    let (src_w, src_h) = source;
    let src_ratio = src_w as f64 / src_h as f64;

    if src_ratio > target_ratio {
        // Source is wider: full height, crop the sides
        let width = ((src_h as f64 * target_ratio).floor() as u32).max(1).min(src_w);
        CropBox {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        // Source is taller (or exact): full width, crop top and bottom
        let height = ((src_w as f64 / target_ratio).floor() as u32).max(1).min(src_h);
        CropBox {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Pixel dimensions of a physical print: `(floor(w × dpi), floor(h × dpi))`.
///
/// # Examples
/// ```
/// # use printcrop::catalog::SizeSpec;
/// # use printcrop::imaging::calculations::print_pixels;
/// assert_eq!(print_pixels(SizeSpec::new(20.0, 30.0), 300), (6000, 9000));
/// ```
pub fn print_pixels(size: SizeSpec, dpi: u32) -> (u32, u32) {
    let dpi = dpi as f64;
    (
        (size.width * dpi).floor() as u32,
        (size.height * dpi).floor() as u32,
    )
}

/// Pixels per metre for a DPI value, as stored in a PNG `pHYs` chunk.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}
