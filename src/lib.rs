//! # printcrop
//!
//! Batch-converts photographs into a fixed catalog of print-ready crops. Every
//! source image becomes one file per (ratio family, print size, format), each
//! center-cropped to the print's exact aspect ratio, resampled to its exact
//! pixel size at the configured DPI, optionally watermarked, and filed under a
//! per-family directory. The whole output tree is then zipped into one bundle.
//!
//! # Pipeline
//!
//! ```text
//! input file / directory
//!   └── run::collect_inputs          (non-recursive, extension filter)
//!       └── process::process_image   (per source image)
//!           ├── catalog              orientation → ratio families → sizes
//!           ├── imaging              crop → resize → watermark → encode
//!           └── naming               out/<family>/<base>_<label>.<ext>
//!   └── archive::zip_output          (once, after the last image)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Static size catalog: orientations, ratio families, ISO labels |
//! | [`imaging`] | Pure-Rust image operations: crop math, resize, watermark, PNG/JPEG encoding |
//! | [`naming`] | Deterministic output directory and file names |
//! | [`process`] | Per-image print generation with progress reporting |
//! | [`archive`] | Zip bundle of the finished output tree |
//! | [`run`] | Batch entry point: input collection, per-job outcomes, final archive |
//! | [`config`] | `printcrop.toml` loading, validation and merging |
//! | [`types`] | Shared types (`OutputFormat`) |
//! | [`output`] | CLI output formatting for runs, progress and the catalog |
//!
//! # Design Decisions
//!
//! ## Backend Trait at the Codec Boundary
//!
//! All pixel work goes through [`imaging::ImageBackend`]. The batch and run
//! logic never touches a raster directly, so tests drive it with a recording
//! mock and check file counts, ordering and exact pixel plans (6000×9000 for a
//! 20×30 inch print at 300 dpi) without rendering hundreds of megapixels.
//!
//! ## Catalog Built Once
//!
//! [`catalog::SizeCatalog::standard`] is a lazily built static shared by every
//! image. ISO labels are an ordered list matched with a small epsilon, so a
//! size that drifts by float rounding still gets its `A4` label.
//!
//! ## Failures Stay Local
//!
//! A source that cannot be decoded or written is recorded as a failed job and
//! the batch moves on. Files it wrote before failing stay on disk and go into
//! the archive. Only an invalid input path, an unwritable output root, or an
//! archive failure stop a run.
//!
//! ## Two-Tier Watermark Font
//!
//! The preferred font (configured, else a well-known system font) is loaded
//! once per run. If it is missing or unreadable, an embedded DejaVu Sans is
//! used instead and a warning is logged; font trouble never fails a job.
//!
//! ## Print Metadata
//!
//! PNG files carry a `pHYs` chunk and JPEG files a JFIF density, both derived
//! from the DPI, so print drivers see the intended physical size.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod run;
pub mod types;
