//! Bundles the output tree into a single zip archive.
//!
//! Runs once, after every image of a batch has been processed. Every regular
//! file under the output root is stored (deflated) under its path relative to
//! the root, with `/` separators. The archive itself lives at the root and is
//! never added to itself, so re-running over the same root replaces the old
//! bundle.
//!
//! Files are visited in name order (`walkdir` sorted by file name), which
//! makes the entry order stable across runs and platforms.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot walk output tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Where the archive was written and how many files it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: usize,
}

/// Archive entry name for `path` relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Zip every regular file under `root` into `root/<archive_name>`.
///
/// Succeeds with zero entries when the tree is empty.
pub fn zip_output(root: &Path, archive_name: &str) -> Result<ArchiveSummary, ArchiveError> {
    let archive_path = root.join(archive_name);
    let mut zip = ZipWriter::new(BufWriter::new(File::create(&archive_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.path() == archive_path {
            continue;
        }
        let Some(name) = entry_name(root, entry.path()) else {
            continue;
        };

        zip.start_file(name.as_str(), options)?;
        io::copy(&mut File::open(entry.path())?, &mut zip)?;
        tracing::debug!(entry = %name, "Archived");
        entries += 1;
    }

    zip.finish()?;
    tracing::info!(path = %archive_path.display(), entries, "Wrote archive");
    Ok(ArchiveSummary {
        path: archive_path,
        entries,
    })
}
