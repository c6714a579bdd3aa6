//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Aspect crop** | `image::imageops::crop_imm` |
//! | **Print resize** | Lanczos3 via `image::imageops::resize` |
//! | **Watermark** | `imageproc` text drawing + `ab_glyph` fonts |
//! | **Encode → PNG / JPEG** | `png` (pHYs chunk) / `image` JPEG encoder (JFIF density) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and print-size math (unit testable)
//! - **Parameters**: Data structures describing one render or encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Buffer-level crop and resize built on the calculations
//! - **Watermark**: Bottom-right text overlay with font fallback

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod watermark;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::CropBox;
pub use params::{EncodeParams, PrintImage, Quality, RenderParams};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
pub use watermark::{FontSource, Watermarker};
