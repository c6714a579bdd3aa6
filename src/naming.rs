//! Output file naming for generated prints.
//!
//! Every print lands at a path derived from four parts:
//!
//! ```text
//! <output root>/<family dir>/<base name>_<label>.<extension>
//! ```
//!
//! - **Family dir**: the ratio family name with `:` replaced by `x`
//!   (`2:3` → `2x3`, `ISO` stays `ISO`).
//! - **Base name**: the source file name without its final extension
//!   (`holiday.photo.jpg` → `holiday.photo`).
//! - **Label**: the ISO code (`A4`) or `{width}x{height}` in inches
//!   (`8x10`, `11.7x16.5`), see [`catalog::label_for`](crate::catalog::label_for).
//! - **Extension**: `png` or `jpg`.

use crate::types::OutputFormat;
use std::path::{Path, PathBuf};

/// Directory name for a ratio family: `:` becomes `x`.
///
/// - `"2:3"` → `"2x3"`
/// - `"ISO"` → `"ISO"`
/// - `"11x14"` → `"11x14"`
pub fn family_dir_name(family: &str) -> String {
    family.replace(':', "x")
}

/// Source file name without its final extension, if it has a usable stem.
///
/// - `/in/beach.jpg` → `Some("beach")`
/// - `/in/holiday.photo.PNG` → `Some("holiday.photo")`
/// - `/in/.png` → `Some(".png")` (a dotfile has no extension)
/// - `/` → `None`
pub fn base_name(source: &Path) -> Option<String> {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// File name of one print: `<base>_<label>.<ext>`.
pub fn print_file_name(base: &str, label: &str, format: OutputFormat) -> String {
    format!("{}_{}.{}", base, label, format.extension())
}

/// Full output path of one print under `root`.
pub fn output_path(
    root: &Path,
    family: &str,
    base: &str,
    label: &str,
    format: OutputFormat,
) -> PathBuf {
    root.join(family_dir_name(family))
        .join(print_file_name(base, label, format))
}

/// Create (if needed) and return the family directory under `root`.
pub fn ensure_family_dir(root: &Path, family: &str) -> std::io::Result<PathBuf> {
    let dir = root.join(family_dir_name(family));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
