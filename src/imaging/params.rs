//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the batch processor (which decides which prints to
//! create) and the [`backend`](super::backend) (which does the pixel work).
//! This separation allows swapping backends (e.g. for testing with a mock)
//! without changing the batch logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`PrintImage`]: A rendered raster tagged with its print resolution.
//! - [`RenderParams`]: Crop box, physical size, DPI and optional watermark for one print.
//! - [`EncodeParams`]: Output path, format and quality for one file.

use super::calculations::CropBox;
use crate::catalog::SizeSpec;
use crate::types::OutputFormat;
use image::RgbImage;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// In-memory raster plus the DPI it is meant to be printed at.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintImage {
    pub pixels: RgbImage,
    pub dpi: u32,
}

impl PrintImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Parameters for rendering one print from a decoded source.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub crop: CropBox,
    pub size: SizeSpec,
    pub dpi: u32,
    /// Final pixel size, `print_pixels(size, dpi)`.
    pub width: u32,
    pub height: u32,
    pub watermark: Option<String>,
}

/// Parameters for writing one rendered print to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
}
