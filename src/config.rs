//! Settings module.
//!
//! Handles loading, validating, and merging the optional `printcrop.toml`
//! settings file. Stock defaults are the base layer; a user file only needs
//! the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! dpi = 300                               # Print resolution (1-1200)
//! archive_name = "processed_images.zip"   # Bundle written at the output root
//!
//! [jpeg]
//! quality = 95              # JPEG encoding quality (1-100)
//!
//! [watermark]
//! # font = "/path/to/font.ttf"  # Preferred font (omit to try system fonts)
//! color = [255, 255, 255]   # Text color (RGB)
//! inset = 10                # Pixels from the right and bottom edges
//! scale_divisor = 20        # Font pixel size = image height / scale_divisor
//! ```
//!
//! Unknown keys are rejected to catch typos early. `dpi` is capped at
//! [`MAX_DPI`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "printcrop.toml";

/// Highest accepted print resolution.
pub const MAX_DPI: u32 = 1200;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Pipeline settings loaded from `printcrop.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Print resolution in dots per inch.
    pub dpi: u32,
    /// File name of the archive written at the output root.
    pub archive_name: String,
    /// JPEG encoder settings.
    pub jpeg: JpegConfig,
    /// Watermark appearance and font.
    pub watermark: WatermarkConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dpi: 300,
            archive_name: "processed_images.zip".to_string(),
            jpeg: JpegConfig::default(),
            watermark: WatermarkConfig::default(),
        }
    }
}

impl Settings {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi == 0 {
            return Err(ConfigError::Validation("dpi must be positive".into()));
        }
        if self.dpi > MAX_DPI {
            return Err(ConfigError::Validation(format!(
                "dpi must be at most {MAX_DPI}"
            )));
        }
        if self.jpeg.quality == 0 || self.jpeg.quality > 100 {
            return Err(ConfigError::Validation(
                "jpeg.quality must be 1-100".into(),
            ));
        }
        if self.watermark.scale_divisor == 0 {
            return Err(ConfigError::Validation(
                "watermark.scale_divisor must be non-zero".into(),
            ));
        }
        let name = Path::new(&self.archive_name);
        if self.archive_name.is_empty()
            || name.file_name().map(|n| n != name.as_os_str()).unwrap_or(true)
        {
            return Err(ConfigError::Validation(
                "archive_name must be a plain file name".into(),
            ));
        }
        Ok(())
    }
}

/// JPEG encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    pub quality: u32,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

/// Watermark appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Preferred font file. When absent, well-known system fonts are tried;
    /// the embedded font is the last resort either way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    pub color: [u8; 3],
    pub inset: u32,
    pub scale_divisor: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font: None,
            color: [255, 255, 255],
            inset: 10,
            scale_divisor: 20,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a settings file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from [`CONFIG_FILE_NAME`] in the given directory.
pub fn load_config(dir: &Path) -> Result<Settings, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Load settings from a file, falling back to defaults when absent.
pub fn load_config_file(path: &Path) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load settings from a file the user named explicitly.
///
/// Unlike [`load_config_file`], a missing file is an error.
pub fn load_required_config_file(path: &Path) -> Result<Settings, ConfigError> {
    let overlay =
        load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.to_path_buf()))?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `printcrop.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# printcrop settings
# ==================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Print resolution of every generated file, in dots per inch.
# A 20x30 inch print at 300 dpi is 6000x9000 pixels. Maximum 1200.
dpi = 300

# Name of the zip bundle written at the output root after a run.
archive_name = "processed_images.zip"

# ---------------------------------------------------------------------------
# JPEG output
# ---------------------------------------------------------------------------
[jpeg]
# Encoding quality (1 = worst, 100 = best).
quality = 95

# ---------------------------------------------------------------------------
# Watermark (only drawn when --watermark is given)
# ---------------------------------------------------------------------------
[watermark]
# Preferred font file. When omitted, common system sans-serif fonts are
# tried; the built-in font is used if none can be loaded.
# font = "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"

# Text color as [red, green, blue].
color = [255, 255, 255]

# Distance in pixels from the right and bottom edges.
inset = 10

# Font pixel size is the image height divided by this value.
scale_divisor = 20
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.dpi, 300);
        assert_eq!(settings.archive_name, "processed_images.zip");
        assert_eq!(settings.jpeg.quality, 95);
        assert_eq!(settings.watermark.inset, 10);
        assert_eq!(settings.watermark.scale_divisor, 20);
        assert_eq!(settings.watermark.font, None);
    }

    #[test]
    fn parse_partial_config() {
        let settings: Settings = toml::from_str("dpi = 150").unwrap();
        assert_eq!(settings.dpi, 150);
        // Defaults preserved
        assert_eq!(settings.jpeg.quality, 95);
        assert_eq!(settings.watermark.color, [255, 255, 255]);
    }

    #[test]
    fn parse_watermark_settings() {
        let toml = r##"
[watermark]
font = "/fonts/Brand.ttf"
color = [0, 0, 0]
inset = 24
"##;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(
            settings.watermark.font.as_deref(),
            Some(Path::new("/fonts/Brand.ttf"))
        );
        assert_eq!(settings.watermark.color, [0, 0, 0]);
        assert_eq!(settings.watermark.inset, 24);
        assert_eq!(settings.watermark.scale_divisor, 20);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let settings: Settings = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let settings = load_config(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "dpi = 200\n\n[jpeg]\nquality = 80\n",
        )
        .unwrap();

        let settings = load_config(tmp.path()).unwrap();
        assert_eq!(settings.dpi, 200);
        assert_eq!(settings.jpeg.quality, 80);
        assert_eq!(settings.archive_name, "processed_images.zip");
    }

    #[test]
    fn required_config_file_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        let result = load_required_config_file(&missing);
        assert!(matches!(result, Err(ConfigError::NotFound(path)) if path == missing));
    }

    #[test]
    fn required_config_file_is_merged_over_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("studio.toml");
        fs::write(&path, "dpi = 600\n").unwrap();

        let settings = load_required_config_file(&path).unwrap();
        assert_eq!(settings.dpi, 600);
        assert_eq!(settings.jpeg.quality, 95);
    }

    #[test]
    fn required_config_file_is_validated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("studio.toml");
        fs::write(&path, "dpi = 0\n").unwrap();
        assert!(matches!(
            load_required_config_file(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "dpii = 300").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<Settings, _> = toml::from_str("[webp]\nquality = 80");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn zero_dpi_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "dpi = 0").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn dpi_above_maximum_rejected() {
        let mut settings = Settings::default();
        settings.dpi = MAX_DPI;
        assert!(settings.validate().is_ok());
        settings.dpi = MAX_DPI + 1;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("1200")
        ));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        let mut settings = Settings::default();
        settings.jpeg.quality = 101;
        assert!(settings.validate().is_err());
        settings.jpeg.quality = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_scale_divisor_rejected() {
        let mut settings = Settings::default();
        settings.watermark.scale_divisor = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn archive_name_must_be_plain() {
        let mut settings = Settings::default();
        settings.archive_name = "nested/bundle.zip".into();
        assert!(settings.validate().is_err());
        settings.archive_name = String::new();
        assert!(settings.validate().is_err());
        settings.archive_name = "bundle.zip".into();
        assert!(settings.validate().is_ok());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("dpi = 300").unwrap();
        let overlay: toml::Value = toml::from_str("dpi = 150").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("dpi").unwrap().as_integer(), Some(150));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[watermark]\ninset = 5").unwrap();
        let settings: Settings = merge_toml(base, overlay).try_into().unwrap();
        assert_eq!(settings.watermark.inset, 5);
        assert_eq!(settings.watermark.scale_divisor, 20);
        assert_eq!(settings.dpi, 300);
    }
}
