//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every source image is shown by its positional index and base name first,
//! with filesystem paths as indented `Source:` context. Formatting is done by
//! pure `format_*` functions returning lines (testable, no I/O); the `print_*`
//! wrappers only write them to stdout.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! 001 beach (38 files)
//!     Source: photos/beach.jpg
//! 002 broken (failed)
//!     Source: photos/broken.png
//!     Error: Cannot decode photos/broken.png: ...
//!     Written before failure: 0 files
//!
//! Skipped
//!     notes.txt
//!
//! Archive
//!     out/processed_images.zip (38 entries)
//!
//! Processed 1, failed 1, skipped 1
//! ```
//!
//! ## Sizes
//!
//! ```text
//! Vertical catalog at 300 dpi (38 files per image)
//! 2:3 → 2x3/
//!     4x6         4 x 6 in     1200 x 1800 px
//!     ...
//! ISO → ISO/
//!     A5          5.8 x 8.3 in 1740 x 2490 px
//! ```

use crate::catalog::{Orientation, SizeCatalog};
use crate::imaging::calculations::print_pixels;
use crate::naming::family_dir_name;
use crate::run::{JobOutcome, RunReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

const PROGRESS_WIDTH: usize = 20;

/// Format a progress value as a fixed-width bar.
///
/// ```text
/// [##########          ]  50.0%
/// ```
pub fn format_progress(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>5.1}%",
        "#".repeat(filled),
        " ".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

// ============================================================================
// Run report
// ============================================================================

/// Format the terminal summary of a run.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        let source = outcome.source();
        let title = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name(source));

        match outcome {
            JobOutcome::Processed(image) => {
                lines.push(format!(
                    "{} {} ({})",
                    index,
                    title,
                    plural(image.files.len(), "file", "files")
                ));
                lines.push(format!("{}Source: {}", indent(1), source.display()));
            }
            JobOutcome::Failed {
                error,
                files_written,
                ..
            } => {
                lines.push(format!("{} {} (failed)", index, title));
                lines.push(format!("{}Source: {}", indent(1), source.display()));
                lines.push(format!("{}Error: {}", indent(1), error));
                lines.push(format!(
                    "{}Written before failure: {}",
                    indent(1),
                    plural(files_written.len(), "file", "files")
                ));
            }
        }
    }

    if !report.skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Skipped".to_string());
        for path in &report.skipped {
            lines.push(format!("{}{}", indent(1), file_name(path)));
        }
    }

    if report.cancelled {
        lines.push(String::new());
        lines.push("Cancelled before all images were processed".to_string());
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push("Archive".to_string());
    lines.push(format!(
        "{}{} ({})",
        indent(1),
        report.archive.path.display(),
        plural(report.archive.entries, "entry", "entries")
    ));

    lines.push(String::new());
    lines.push(format!(
        "Processed {}, failed {}, skipped {}",
        report.processed_count(),
        report.failed_count(),
        report.skipped.len()
    ));
    lines
}

/// Print the run summary to stdout.
pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Catalog listing
// ============================================================================

/// Format one orientation of the catalog with labels and pixel sizes at `dpi`.
pub fn format_catalog(catalog: &SizeCatalog, orientation: Orientation, dpi: u32) -> Vec<String> {
    let title = match orientation {
        Orientation::Vertical => "Vertical",
        Orientation::Horizontal => "Horizontal",
    };
    let mut lines = vec![format!(
        "{} catalog at {} dpi ({} files per image)",
        title,
        dpi,
        catalog.file_count(orientation)
    )];

    for family in catalog.families(orientation) {
        lines.push(format!("{} → {}/", family.name, family_dir_name(&family.name)));
        for &size in &family.sizes {
            let (width, height) = print_pixels(size, dpi);
            let inches = format!("{} x {} in", size.width, size.height);
            lines.push(format!(
                "{}{:<11} {:<12} {} x {} px",
                indent(1),
                catalog.label_for(size),
                inches,
                width,
                height
            ));
        }
    }
    lines
}

/// Print the catalog listing to stdout.
pub fn print_catalog(catalog: &SizeCatalog, orientation: Orientation, dpi: u32) {
    for line in format_catalog(catalog, orientation, dpi) {
        println!("{}", line);
    }
}
