//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, BMP, GIF) | `image::ImageReader` |
//! | Crop | `image::imageops::crop_imm` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Watermark | `imageproc::drawing::draw_text_mut` + `ab_glyph` |
//! | Encode → PNG | `png` crate (writes the `pHYs` resolution chunk) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (JFIF density in DPI) |

use super::backend::{BackendError, ImageBackend};
use super::calculations::pixels_per_meter;
use super::operations::{crop, resize_for_print};
use super::params::{EncodeParams, PrintImage, RenderParams};
use super::watermark::Watermarker;
use crate::config::WatermarkConfig;
use crate::types::OutputFormat;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ExtendedColorType, ImageEncoder, ImageReader, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Extensions accepted as batch input (compared case-insensitively).
const INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

/// Returns the set of image file extensions accepted as input.
pub fn supported_input_extensions() -> &'static [&'static str] {
    INPUT_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`].
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            INPUT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone)]
pub struct RustBackend {
    watermarker: Watermarker,
}

impl RustBackend {
    pub fn new(watermarker: Watermarker) -> Self {
        Self { watermarker }
    }

    pub fn from_config(config: &WatermarkConfig) -> Self {
        Self::new(Watermarker::new(config))
    }

    pub fn watermarker(&self) -> &Watermarker {
        &self.watermarker
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::from_config(&WatermarkConfig::default())
    }
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Write an RGB PNG with a `pHYs` chunk carrying the print resolution.
fn save_png(image: &PrintImage, path: &Path) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = pixels_per_meter(image.dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(|e| encode_error(path, e))?;
    writer
        .write_image_data(image.pixels.as_raw())
        .map_err(|e| encode_error(path, e))?;
    writer.finish().map_err(|e| encode_error(path, e))
}

/// Write a baseline JPEG with JFIF density in dots per inch.
fn save_jpeg(image: &PrintImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    let dpi = u16::try_from(image.dpi).unwrap_or(u16::MAX);
    encoder.set_pixel_density(PixelDensity::dpi(dpi));
    encoder
        .write_image(
            image.pixels.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| encode_error(path, e))
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError> {
        let decoded = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(decoded.into_rgb8())
    }

    fn render(&self, source: &RgbImage, params: &RenderParams) -> Result<PrintImage, BackendError> {
        if source.width() == 0 || source.height() == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Source image is empty ({}x{})",
                source.width(),
                source.height()
            )));
        }

        let cropped = crop(source, params.crop);
        let mut print = resize_for_print(&cropped, params.size, params.dpi);
        drop(cropped);

        if (print.width(), print.height()) != (params.width, params.height) {
            return Err(BackendError::ProcessingFailed(format!(
                "Resized to {}x{}, expected {}x{}",
                print.width(),
                print.height(),
                params.width,
                params.height
            )));
        }

        self.watermarker
            .apply_mut(&mut print.pixels, params.watermark.as_deref());
        Ok(print)
    }

    fn encode(&self, image: &PrintImage, params: &EncodeParams) -> Result<(), BackendError> {
        match params.format {
            OutputFormat::Png => save_png(image, &params.output),
            OutputFormat::Jpg => save_jpeg(image, &params.output, params.quality.value() as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SizeSpec;
    use crate::imaging::calculations::{center_crop_box, print_pixels};
    use crate::imaging::params::Quality;
    use std::path::PathBuf;

    fn test_backend() -> RustBackend {
        RustBackend::from_config(&WatermarkConfig {
            font: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..WatermarkConfig::default()
        })
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
    }

    fn render_params(source: (u32, u32), size: SizeSpec, dpi: u32, mark: Option<&str>) -> RenderParams {
        let (width, height) = print_pixels(size, dpi);
        RenderParams {
            crop: center_crop_box(source, size.ratio()),
            size,
            dpi,
            width,
            height,
            watermark: mark.map(str::to_string),
        }
    }

    #[test]
    fn supported_extensions_match_accepted_inputs() {
        let exts = supported_input_extensions();
        for expected in &["png", "jpg", "jpeg", "tiff", "bmp", "gif"] {
            assert!(exts.contains(expected), "expected {expected}");
        }
    }

    #[test]
    fn supported_input_is_case_insensitive() {
        assert!(is_supported_input(Path::new("/in/photo.JPG")));
        assert!(is_supported_input(Path::new("/in/photo.Tiff")));
        assert!(!is_supported_input(Path::new("/in/notes.txt")));
        assert!(!is_supported_input(Path::new("/in/README")));
    }

    #[test]
    fn decode_png_to_rgb() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.png");
        gradient(60, 90).save(&path).unwrap();

        let decoded = test_backend().decode(&path).unwrap();
        assert_eq!(decoded.dimensions(), (60, 90));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let result = test_backend().decode(&path);
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn decode_missing_file_is_io_error() {
        let result = test_backend().decode(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn render_exact_print_size() {
        let backend = test_backend();
        let size = SizeSpec::new(4.0, 6.0);
        let print = backend
            .render(&gradient(600, 900), &render_params((600, 900), size, 25, None))
            .unwrap();
        assert_eq!((print.width(), print.height()), (100, 150));
        assert_eq!(print.dpi, 25);
    }

    #[test]
    fn render_with_watermark_differs() {
        let backend = test_backend();
        let size = SizeSpec::new(4.0, 6.0);
        let source = RgbImage::new(600, 900);
        let plain = backend
            .render(&source, &render_params((600, 900), size, 50, None))
            .unwrap();
        let marked = backend
            .render(&source, &render_params((600, 900), size, 50, Some("Test")))
            .unwrap();
        assert_eq!(plain.pixels.dimensions(), marked.pixels.dimensions());
        assert_ne!(plain.pixels, marked.pixels);
    }

    #[test]
    fn render_empty_source_is_processing_error() {
        let backend = test_backend();
        let size = SizeSpec::new(4.0, 6.0);
        for source in [(0, 900), (600, 0), (0, 0)] {
            let result = backend.render(
                &RgbImage::new(source.0, source.1),
                &render_params(source, size, 25, None),
            );
            assert!(
                matches!(result, Err(BackendError::ProcessingFailed(_))),
                "{source:?}"
            );
        }
    }

    #[test]
    fn encode_png_and_jpg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = test_backend();
        let print = PrintImage {
            pixels: gradient(40, 60),
            dpi: 300,
        };

        for format in OutputFormat::ALL {
            let output = tmp.path().join(format!("print.{format}"));
            backend
                .encode(
                    &print,
                    &EncodeParams {
                        output: output.clone(),
                        format,
                        quality: Quality::default(),
                    },
                )
                .unwrap();
            assert_eq!(image::image_dimensions(&output).unwrap(), (40, 60));
        }
    }

    #[test]
    fn png_carries_print_resolution() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("print.png");
        let print = PrintImage {
            pixels: gradient(10, 10),
            dpi: 300,
        };
        save_png(&print, &output).unwrap();

        let decoder = png::Decoder::new(File::open(&output).unwrap());
        let reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn jpeg_carries_print_resolution() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("print.jpg");
        let print = PrintImage {
            pixels: gradient(10, 10),
            dpi: 300,
        };
        save_jpeg(&print, &output, 90).unwrap();

        // JFIF APP0: "JFIF\0", version (2 bytes), units=1 (dpi), Xdensity, Ydensity
        let bytes = std::fs::read(&output).unwrap();
        let jfif = bytes
            .windows(5)
            .position(|w| w == b"JFIF\0")
            .expect("JFIF header");
        assert_eq!(bytes[jfif + 7], 1);
        assert_eq!(u16::from_be_bytes([bytes[jfif + 8], bytes[jfif + 9]]), 300);
        assert_eq!(u16::from_be_bytes([bytes[jfif + 10], bytes[jfif + 11]]), 300);
    }

    #[test]
    fn encode_into_missing_directory_is_io_error() {
        let print = PrintImage {
            pixels: gradient(4, 4),
            dpi: 300,
        };
        let result = test_backend().encode(
            &print,
            &EncodeParams {
                output: PathBuf::from("/nonexistent/dir/print.png"),
                format: OutputFormat::Png,
                quality: Quality::default(),
            },
        );
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
