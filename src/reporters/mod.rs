//! Output reporters for numtally results
//!
//! Every run produces two JSON Lines artifacts:
//! - counts: `{"category", "total_count", "unique_count", "counts"}`
//! - ratios: `{"category", "ratios"}`

mod jsonl;

pub use jsonl::{read_counts, read_ratios, render_counts, render_ratios};

use crate::models::{CategoryRatios, CategorySummary};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to parse line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the two artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub counts: PathBuf,
    pub ratios: PathBuf,
}

/// Render both artifacts, then write them.
///
/// Rendering happens before any file is touched, and each artifact is staged
/// in a temporary file next to its target. Nothing is renamed into place
/// until both staged writes succeed, so a failure on either artifact leaves
/// any previous outputs untouched.
pub fn write_reports(
    paths: &ReportPaths,
    summaries: &[CategorySummary],
    ratios: &[CategoryRatios],
) -> Result<(), ReportError> {
    let counts = render_counts(summaries)?;
    let ratio_lines = render_ratios(ratios)?;

    let staged_counts = stage_file(&paths.counts, &counts)?;
    let staged_ratios = stage_file(&paths.ratios, &ratio_lines)?;

    persist_file(staged_counts, &paths.counts)?;
    persist_file(staged_ratios, &paths.ratios)?;
    Ok(())
}

fn stage_file(path: &Path, content: &str) -> Result<NamedTempFile, ReportError> {
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    debug!("Staged {} bytes for {}", content.len(), path.display());
    Ok(file)
}

fn persist_file(file: NamedTempFile, path: &Path) -> Result<(), ReportError> {
    file.persist(path).map_err(|err| ReportError::Write {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    debug!("Wrote {}", path.display());
    Ok(())
}
