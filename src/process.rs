//! Per-image print generation.
//!
//! Takes one decoded source image and produces every print in the catalog for
//! its orientation: each ratio family, each size in the family, each output
//! format.
//!
//! ## Processing Order
//!
//! ```text
//! families (catalog order)
//! └── sizes (catalog order)
//!     ├── render once: center-crop → resize → watermark
//!     ├── encode png → report progress
//!     └── encode jpg → report progress
//! ```
//!
//! The progress denominator is the number of files the image will produce
//! (Σ sizes × 2). A report follows every written file, so the last report for
//! an image is exactly `100.0`.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── 2x3/
//! │   ├── beach_4x6.png
//! │   ├── beach_4x6.jpg
//! │   └── ...
//! ├── 4x5/
//! ├── ISO/
//! │   ├── beach_A5.png
//! │   └── ...
//! └── 11x14/
//! ```
//!
//! ## Failures
//!
//! A failure stops the image where it happened. Files written before the
//! failure stay on disk and are returned in [`ImageFailure::written`] so the
//! caller can report them.

use crate::catalog::{Orientation, SizeCatalog, SizeSpec};
use crate::config::Settings;
use crate::imaging::calculations::{CropBox, center_crop_box, print_pixels};
use crate::imaging::{
    BackendError, Dimensions, EncodeParams, ImageBackend, Quality, RenderParams,
};
use crate::naming;
use crate::types::OutputFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot render {label} print: {source}")]
    Render {
        label: String,
        #[source]
        source: BackendError,
    },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Source has no usable file name: {0}")]
    InvalidStem(PathBuf),
    #[error("Source image is empty ({width}x{height}): {path}")]
    EmptyImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// A failed image together with the files it wrote before failing.
#[derive(Error, Debug)]
#[error("{error} ({} files written)", .written.len())]
pub struct ImageFailure {
    pub error: ProcessError,
    pub written: Vec<GeneratedFile>,
}

/// Receives progress for the image being processed, as a percentage.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// One image to turn into prints.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessJob {
    pub source: PathBuf,
    pub output_root: PathBuf,
    /// Drawn on every print when present and non-empty.
    pub watermark: Option<String>,
}

impl ProcessJob {
    pub fn new(source: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_root: output_root.into(),
            watermark: None,
        }
    }

    pub fn with_watermark(mut self, text: Option<String>) -> Self {
        self.watermark = text;
        self
    }
}

/// Settings that affect the pixels and bytes of each print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSettings {
    pub dpi: u32,
    pub quality: Quality,
}

impl ProcessSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dpi: settings.dpi,
            quality: Quality::new(settings.jpeg.quality),
        }
    }
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// One print to render: where it comes from in the source and how big it is.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintPlan {
    pub family: String,
    pub size: SizeSpec,
    pub label: String,
    pub crop: CropBox,
    pub width: u32,
    pub height: u32,
}

/// A file written for one print.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub family: String,
    pub label: String,
    pub format: OutputFormat,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Everything generated for one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub source: PathBuf,
    pub base_name: String,
    pub orientation: Orientation,
    pub dimensions: Dimensions,
    pub files: Vec<GeneratedFile>,
}

/// Plan every print for a source of the given size, in processing order.
pub fn plan_prints(dimensions: Dimensions, catalog: &SizeCatalog, dpi: u32) -> Vec<PrintPlan> {
    let source = (dimensions.width, dimensions.height);
    catalog
        .select_sizes(dimensions.width, dimensions.height)
        .iter()
        .flat_map(|family| {
            family.sizes.iter().map(|&size| {
                let (width, height) = print_pixels(size, dpi);
                PrintPlan {
                    family: family.name.clone(),
                    size,
                    label: catalog.label_for(size),
                    crop: center_crop_box(source, size.ratio()),
                    width,
                    height,
                }
            })
        })
        .collect()
}

/// Percentage of `completed` out of `total`, exactly `100.0` when done.
pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// Generate every print for one source image.
pub fn process_image(
    backend: &impl ImageBackend,
    catalog: &SizeCatalog,
    job: &ProcessJob,
    settings: &ProcessSettings,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ImageReport, ImageFailure> {
    let mut written = Vec::new();
    match generate_prints(backend, catalog, job, settings, progress, &mut written) {
        Ok((base_name, orientation, dimensions)) => Ok(ImageReport {
            source: job.source.clone(),
            base_name,
            orientation,
            dimensions,
            files: written,
        }),
        Err(error) => Err(ImageFailure { error, written }),
    }
}

fn generate_prints(
    backend: &impl ImageBackend,
    catalog: &SizeCatalog,
    job: &ProcessJob,
    settings: &ProcessSettings,
    mut progress: Option<&mut dyn ProgressSink>,
    written: &mut Vec<GeneratedFile>,
) -> Result<(String, Orientation, Dimensions), ProcessError> {
    let base_name = naming::base_name(&job.source)
        .ok_or_else(|| ProcessError::InvalidStem(job.source.clone()))?;

    let source = backend
        .decode(&job.source)
        .map_err(|source| ProcessError::Decode {
            path: job.source.clone(),
            source,
        })?;
    let dimensions = Dimensions::of(&source);
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(ProcessError::EmptyImage {
            path: job.source.clone(),
            width: dimensions.width,
            height: dimensions.height,
        });
    }
    let orientation = Orientation::of(dimensions.width, dimensions.height);

    let plans = plan_prints(dimensions, catalog, settings.dpi);
    let total = plans.len() * OutputFormat::ALL.len();
    tracing::info!(
        source = %job.source.display(),
        width = dimensions.width,
        height = dimensions.height,
        %orientation,
        files = total,
        "Processing image"
    );

    let mut current_family: Option<&str> = None;
    for plan in &plans {
        if current_family != Some(plan.family.as_str()) {
            ensure_dir(&job.output_root, &plan.family)?;
            current_family = Some(plan.family.as_str());
        }

        let print = backend
            .render(
                &source,
                &RenderParams {
                    crop: plan.crop,
                    size: plan.size,
                    dpi: settings.dpi,
                    width: plan.width,
                    height: plan.height,
                    watermark: job.watermark.clone().filter(|t| !t.is_empty()),
                },
            )
            .map_err(|source| ProcessError::Render {
                label: plan.label.clone(),
                source,
            })?;

        for format in OutputFormat::ALL {
            let path = naming::output_path(
                &job.output_root,
                &plan.family,
                &base_name,
                &plan.label,
                format,
            );
            backend
                .encode(
                    &print,
                    &EncodeParams {
                        output: path.clone(),
                        format,
                        quality: settings.quality,
                    },
                )
                .map_err(|source| ProcessError::Write {
                    path: path.clone(),
                    source,
                })?;

            tracing::debug!(path = %path.display(), width = plan.width, height = plan.height, "Wrote print");
            written.push(GeneratedFile {
                family: plan.family.clone(),
                label: plan.label.clone(),
                format,
                path,
                width: plan.width,
                height: plan.height,
            });

            if let Some(sink) = progress.as_deref_mut() {
                sink.report(progress_percent(written.len(), total));
            }
        }
    }

    Ok((base_name, orientation, dimensions))
}

fn ensure_dir(root: &Path, family: &str) -> Result<PathBuf, ProcessError> {
    naming::ensure_family_dir(root, family).map_err(|source| ProcessError::CreateDir {
        path: root.join(naming::family_dir_name(family)),
        source,
    })
}
