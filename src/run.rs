//! Batch entry point: one file or a directory of files, then the archive.
//!
//! ```text
//! input ──► collect_inputs ──► process_image (per file) ──► zip_output
//!             │                    │
//!             └─ skipped files     └─ JobOutcome per file
//! ```
//!
//! A directory is scanned non-recursively. Files with a recognised image
//! extension become jobs in directory-listing order; other files are reported
//! as skipped and subdirectories are ignored.
//!
//! A failing image never stops the batch: its outcome is recorded and the
//! next image starts. The archive is written exactly once, after the last job,
//! over whatever the jobs produced.

use crate::archive::{self, ArchiveError, ArchiveSummary};
use crate::catalog::SizeCatalog;
use crate::config::Settings;
use crate::imaging::{ImageBackend, RustBackend, is_supported_input};
use crate::process::{
    GeneratedFile, ImageReport, ProcessError, ProcessJob, ProcessSettings, ProgressSink,
    process_image,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Input path is neither a file nor a directory: {0}")]
    InvalidInputPath(PathBuf),
    #[error("Cannot read input directory {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot create output directory {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Archive failed: {0}")]
    Archive(#[from] ArchiveError),
}

/// Per-run options supplied by the caller.
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Text drawn on every print, if any.
    pub watermark: Option<String>,
    /// Checked before each image starts; once set, no further images are
    /// processed.
    pub cancel: Option<&'a AtomicBool>,
    /// Receives per-image progress (0–100, restarting for each image).
    pub progress: Option<&'a mut dyn ProgressSink>,
}

/// Result of one image job.
#[derive(Debug)]
pub enum JobOutcome {
    Processed(ImageReport),
    Failed {
        source: PathBuf,
        error: ProcessError,
        /// Files written before the failure; they stay on disk and in the archive.
        files_written: Vec<GeneratedFile>,
    },
}

impl JobOutcome {
    pub fn source(&self) -> &Path {
        match self {
            JobOutcome::Processed(report) => &report.source,
            JobOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Processed(_))
    }
}

/// Everything a run did.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<JobOutcome>,
    /// Directory entries not processed because of their extension.
    pub skipped: Vec<PathBuf>,
    pub archive: ArchiveSummary,
    /// Set when the cancel flag stopped the batch early.
    pub cancelled: bool,
}

impl RunReport {
    pub fn processed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.processed_count()
    }

    pub fn files_written(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                JobOutcome::Processed(report) => report.files.len(),
                JobOutcome::Failed { files_written, .. } => files_written.len(),
            })
            .sum()
    }

    /// No job failed and the batch ran to completion.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0 && !self.cancelled
    }
}

/// Image files to process plus files passed over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSet {
    pub jobs: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Resolve `input` into the list of source images.
///
/// A file is the sole job regardless of extension; the decoder decides whether
/// it is an image. A directory contributes its immediate image files.
pub fn collect_inputs(input: &Path) -> Result<InputSet, RunError> {
    if input.is_file() {
        return Ok(InputSet {
            jobs: vec![input.to_path_buf()],
            skipped: Vec::new(),
        });
    }
    if !input.is_dir() {
        return Err(RunError::InvalidInputPath(input.to_path_buf()));
    }

    let read_err = |source| RunError::ReadInput {
        path: input.to_path_buf(),
        source,
    };
    let mut inputs = InputSet::default();
    for entry in std::fs::read_dir(input).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }
        if is_supported_input(&path) {
            inputs.jobs.push(path);
        } else {
            tracing::warn!(path = %path.display(), "Skipping file with unsupported extension");
            inputs.skipped.push(path);
        }
    }
    Ok(inputs)
}

/// Run the batch with the production backend and the standard catalog.
pub fn run(
    input: &Path,
    output_root: &Path,
    settings: &Settings,
    options: RunOptions<'_>,
) -> Result<RunReport, RunError> {
    let backend = RustBackend::from_config(&settings.watermark);
    run_with_backend(
        &backend,
        SizeCatalog::standard(),
        input,
        output_root,
        settings,
        options,
    )
}

/// Run the batch with a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    catalog: &SizeCatalog,
    input: &Path,
    output_root: &Path,
    settings: &Settings,
    mut options: RunOptions<'_>,
) -> Result<RunReport, RunError> {
    let inputs = collect_inputs(input)?;
    std::fs::create_dir_all(output_root).map_err(|source| RunError::CreateOutput {
        path: output_root.to_path_buf(),
        source,
    })?;

    tracing::info!(
        input = %input.display(),
        images = inputs.jobs.len(),
        skipped = inputs.skipped.len(),
        "Starting batch"
    );

    let process_settings = ProcessSettings::from_settings(settings);
    let mut outcomes = Vec::with_capacity(inputs.jobs.len());
    let mut cancelled = false;

    for source in inputs.jobs {
        if options.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            tracing::info!(remaining = %source.display(), "Batch cancelled");
            cancelled = true;
            break;
        }

        let job = ProcessJob::new(source, output_root).with_watermark(options.watermark.clone());
        let progress = options
            .progress
            .as_mut()
            .map(|sink| &mut **sink as &mut dyn ProgressSink);

        match process_image(backend, catalog, &job, &process_settings, progress) {
            Ok(report) => {
                tracing::info!(
                    source = %report.source.display(),
                    files = report.files.len(),
                    "Processed image"
                );
                outcomes.push(JobOutcome::Processed(report));
            }
            Err(failure) => {
                tracing::warn!(
                    source = %job.source.display(),
                    written = failure.written.len(),
                    "Image failed: {}",
                    failure.error
                );
                outcomes.push(JobOutcome::Failed {
                    source: job.source,
                    error: failure.error,
                    files_written: failure.written,
                });
            }
        }
    }

    let archive = archive::zip_output(output_root, &settings.archive_name)?;

    Ok(RunReport {
        outcomes,
        skipped: inputs.skipped,
        archive,
        cancelled,
    })
}
