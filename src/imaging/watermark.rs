//! Text watermark overlay.
//!
//! The watermark is drawn in the bottom-right corner, `inset` pixels from the
//! right and bottom edges, at a pixel size of `image height / scale_divisor`.
//!
//! ## Font Resolution
//!
//! Fonts are resolved once, when the [`Watermarker`] is built:
//!
//! 1. **Preferred**: the configured font file, or the first readable
//!    well-known system sans-serif when none is configured.
//! 2. **Embedded**: DejaVu Sans, compiled into the binary.
//!
//! A missing or unparsable preferred font is logged and never surfaces as an
//! error.

use crate::config::WatermarkConfig;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font file unreadable {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("Not a usable font file: {0}")]
    Invalid(PathBuf),
    #[error("No preferred font found")]
    NotFound,
}

/// Where the active watermark font came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Preferred(PathBuf),
    Embedded,
}

fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\arial.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        ]
    }
}

fn load_font_file(path: &Path) -> Result<FontArc, FontError> {
    let data = std::fs::read(path).map_err(|e| FontError::Io(path.to_path_buf(), e))?;
    FontArc::try_from_vec(data).map_err(|_| FontError::Invalid(path.to_path_buf()))
}

fn load_preferred_font(configured: Option<&Path>) -> Result<(FontArc, PathBuf), FontError> {
    if let Some(path) = configured {
        return load_font_file(path).map(|font| (font, path.to_path_buf()));
    }
    system_font_candidates()
        .iter()
        .map(Path::new)
        .find_map(|path| {
            load_font_file(path)
                .ok()
                .map(|font| (font, path.to_path_buf()))
        })
        .ok_or(FontError::NotFound)
}

fn embedded_font() -> FontArc {
    FontArc::try_from_slice(EMBEDDED_FONT).expect("embedded font must parse")
}

/// Resolve the watermark font: preferred first, embedded on any failure.
pub fn resolve_font(configured: Option<&Path>) -> (FontArc, FontSource) {
    match load_preferred_font(configured) {
        Ok((font, path)) => {
            tracing::debug!(path = %path.display(), "Using preferred watermark font");
            (font, FontSource::Preferred(path))
        }
        Err(e) => {
            if configured.is_some() {
                tracing::warn!("{e}; falling back to embedded font");
            } else {
                tracing::debug!("{e}; using embedded font");
            }
            (embedded_font(), FontSource::Embedded)
        }
    }
}

/// Draws watermark text with a font resolved once at construction.
#[derive(Clone)]
pub struct Watermarker {
    font: FontArc,
    source: FontSource,
    color: Rgb<u8>,
    inset: u32,
    scale_divisor: u32,
}

impl Watermarker {
    pub fn new(config: &WatermarkConfig) -> Self {
        let (font, source) = resolve_font(config.font.as_deref());
        Self {
            font,
            source,
            color: Rgb(config.color),
            inset: config.inset,
            scale_divisor: config.scale_divisor.max(1),
        }
    }

    pub fn font_source(&self) -> &FontSource {
        &self.source
    }

    /// Font pixel size for an image of the given height.
    pub fn font_px(&self, image_height: u32) -> f32 {
        (image_height as f32 / self.scale_divisor as f32).max(1.0)
    }

    /// Right and bottom edges of the inked area when `text` is drawn at the
    /// origin, laid out glyph by glyph the way `draw_text_mut` places them.
    ///
    /// Glyphs sit on a baseline one ascent below the origin, so the advance
    /// box from `text_size` underestimates how far descenders reach.
    fn ink_extent(&self, scale: PxScale, text: &str) -> (i64, i64) {
        let font = self.font.as_scaled(scale);
        let mut caret = 0.0f32;
        let mut last = None;
        let (mut right, mut bottom) = (0.0f32, 0.0f32);

        for c in text.chars() {
            let id = font.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, point(caret, font.ascent()));
            caret += font.h_advance(id);
            if let Some(outlined) = font.outline_glyph(glyph) {
                if let Some(last) = last {
                    caret += font.kern(id, last);
                }
                last = Some(id);
                let bounds = outlined.px_bounds();
                right = right.max(bounds.max.x);
                bottom = bottom.max(bounds.max.y);
            }
        }
        (right.ceil() as i64, bottom.ceil() as i64)
    }

    /// Top-left text position for `text` on a `width` × `height` image.
    ///
    /// Every inked pixel lands left of `width - inset` and above
    /// `height - inset`, unless the text is larger than the image, in which
    /// case the origin is clamped to 0.
    pub fn text_origin(&self, width: u32, height: u32, text: &str) -> (i32, i32) {
        let scale = PxScale::from(self.font_px(height));
        let (right, bottom) = self.ink_extent(scale, text);
        let x = width as i64 - self.inset as i64 - right;
        let y = height as i64 - self.inset as i64 - bottom;
        (x.max(0) as i32, y.max(0) as i32)
    }

    fn draw(&self, image: &mut RgbImage, text: &str) {
        let (width, height) = image.dimensions();
        let (x, y) = self.text_origin(width, height, text);
        let scale = PxScale::from(self.font_px(height));
        draw_text_mut(image, self.color, x, y, scale, &self.font, text);
    }

    /// Draw `text` bottom-right onto `image` in place.
    ///
    /// Empty or absent text leaves the image untouched.
    pub fn apply_mut(&self, image: &mut RgbImage, text: Option<&str>) {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.draw(image, text);
        }
    }

    /// Return `image` with `text` drawn bottom-right.
    ///
    /// Empty or absent text borrows the input unchanged.
    pub fn apply<'a>(&self, image: &'a RgbImage, text: Option<&str>) -> Cow<'a, RgbImage> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Cow::Borrowed(image);
        };
        let mut marked = image.clone();
        self.draw(&mut marked, text);
        Cow::Owned(marked)
    }
}

impl std::fmt::Debug for Watermarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watermarker")
            .field("source", &self.source)
            .field("color", &self.color)
            .field("inset", &self.inset)
            .field("scale_divisor", &self.scale_divisor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_config() -> WatermarkConfig {
        WatermarkConfig {
            font: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..WatermarkConfig::default()
        }
    }

    fn bundled_font_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSans.ttf")
    }

    fn changed_pixels(a: &RgbImage, b: &RgbImage) -> Vec<(u32, u32)> {
        a.enumerate_pixels()
            .filter(|(x, y, p)| b.get_pixel(*x, *y) != *p)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    // =========================================================================
    // Font resolution
    // =========================================================================

    #[test]
    fn missing_font_falls_back_to_embedded() {
        let marker = Watermarker::new(&embedded_config());
        assert_eq!(marker.font_source(), &FontSource::Embedded);
    }

    #[test]
    fn invalid_font_file_falls_back_to_embedded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bogus = tmp.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let (_, source) = resolve_font(Some(&bogus));
        assert_eq!(source, FontSource::Embedded);
    }

    #[test]
    fn configured_font_is_preferred() {
        let path = bundled_font_path();
        let (_, source) = resolve_font(Some(&path));
        assert_eq!(source, FontSource::Preferred(path));
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    #[test]
    fn no_text_is_passthrough() {
        let marker = Watermarker::new(&embedded_config());
        let image = RgbImage::new(200, 300);
        assert!(matches!(marker.apply(&image, None), Cow::Borrowed(_)));
        assert!(matches!(marker.apply(&image, Some("")), Cow::Borrowed(_)));
    }

    #[test]
    fn font_scales_with_height() {
        let marker = Watermarker::new(&embedded_config());
        assert_eq!(marker.font_px(900), 45.0);
        assert_eq!(marker.font_px(9000), 450.0);
        assert_eq!(marker.font_px(5), 1.0);
    }

    #[test]
    fn text_lands_bottom_right_within_inset() {
        let marker = Watermarker::new(&embedded_config());
        let image = RgbImage::new(600, 900);
        let marked = marker.apply(&image, Some("Test"));

        let changed = changed_pixels(&image, &marked);
        assert!(!changed.is_empty(), "watermark drew nothing");

        let max_x = changed.iter().map(|(x, _)| *x).max().unwrap();
        let max_y = changed.iter().map(|(_, y)| *y).max().unwrap();
        let min_x = changed.iter().map(|(x, _)| *x).min().unwrap();
        let min_y = changed.iter().map(|(_, y)| *y).min().unwrap();

        assert!(max_x < 600 - 10, "text crosses right inset: {max_x}");
        assert!(max_y < 900 - 10, "text crosses bottom inset: {max_y}");
        assert!(min_x > 300, "text not in right half: {min_x}");
        assert!(min_y > 700, "text not near bottom: {min_y}");
    }

    /// Draw `text` on a black `width` × `height` canvas and check that every
    /// inked pixel respects the inset and that some ink reaches the
    /// bottom-right quadrant.
    fn assert_ink_within_inset(width: u32, height: u32, text: &str) {
        let marker = Watermarker::new(&embedded_config());
        let mut image = RgbImage::new(width, height);
        marker.apply_mut(&mut image, Some(text));

        let inked: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [0, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty(), "{text} drew nothing on {width}x{height}");

        for &(x, y) in &inked {
            assert!(x < width - 10, "{text} on {width}x{height}: x {x} crosses inset");
            assert!(y < height - 10, "{text} on {width}x{height}: y {y} crosses inset");
        }
        assert!(
            inked.iter().any(|&(x, y)| x >= width / 2 && y >= height / 2),
            "{text} on {width}x{height}: no ink in bottom-right quadrant"
        );
    }

    #[test]
    fn large_print_keeps_bottom_inset() {
        assert_ink_within_inset(6000, 9000, "Test");
    }

    #[test]
    fn descenders_keep_bottom_inset() {
        assert_ink_within_inset(600, 900, "Typography");
    }

    #[test]
    fn apply_mut_matches_apply() {
        let marker = Watermarker::new(&embedded_config());
        let image = RgbImage::from_pixel(300, 200, Rgb([30, 60, 90]));

        let mut in_place = image.clone();
        marker.apply_mut(&mut in_place, Some("Proof"));
        assert_eq!(in_place, *marker.apply(&image, Some("Proof")));
        assert_ne!(in_place, image);

        let mut untouched = image.clone();
        marker.apply_mut(&mut untouched, None);
        marker.apply_mut(&mut untouched, Some(""));
        assert_eq!(untouched, image);
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let marker = Watermarker::new(&embedded_config());
        let image = RgbImage::new(100, 100);
        let before = image.clone();
        let _ = marker.apply(&image, Some("Proof"));
        assert_eq!(image, before);
    }

    #[test]
    fn oversized_text_is_clamped_to_origin() {
        let marker = Watermarker::new(&embedded_config());
        let (x, y) = marker.text_origin(20, 20, "a very long watermark text");
        assert_eq!(x, 0);
        assert!(y >= 0);
    }

    #[test]
    fn configured_color_is_used() {
        let config = WatermarkConfig {
            color: [255, 0, 0],
            ..embedded_config()
        };
        let marker = Watermarker::new(&config);
        let image = RgbImage::new(400, 400);
        let marked = marker.apply(&image, Some("MMMM"));
        assert!(marked.pixels().any(|p| p.0[0] > 0 && p.0[1] == 0 && p.0[2] == 0));
    }
}
