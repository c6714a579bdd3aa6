//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the image-codec capability the batch
//! processor is written against: decode a source, render one print from it
//! (crop, resample, watermark), and encode a print to disk.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, statically
//! linked, no system libraries.

use super::params::{EncodeParams, PrintImage, RenderParams};
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all three operations so the batch processor
/// stays backend-agnostic.
pub trait ImageBackend: Sync {
    /// Decode a source file into an 8-bit RGB raster.
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Crop, resample and optionally watermark one print.
    fn render(&self, source: &RgbImage, params: &RenderParams)
    -> Result<PrintImage, BackendError>;

    /// Write a rendered print in the requested format.
    fn encode(&self, image: &PrintImage, params: &EncodeParams) -> Result<(), BackendError>;
}
