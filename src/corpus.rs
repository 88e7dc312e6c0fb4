//! Corpus aggregation
//!
//! A corpus is a directory with one subdirectory per category. Each category
//! directory holds a JSONL dataset file. Categories are discovered, sorted by
//! name, scanned (in parallel when more than one worker is configured) and
//! returned in name order so reports are reproducible.

use crate::config::{ConfigError, RunConfig};
use crate::extract::NumberExtractor;
use crate::models::CategorySummary;
use crate::scan::scan_file;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Directory {0} does not exist")]
    RootMissing(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No subdirectories found in {0}")]
    NoCategories(PathBuf),

    #[error("No usable categories in {root}: all {skipped} were skipped")]
    NoUsableCategories { root: PathBuf, skipped: usize },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What the aggregator needs to scan one corpus.
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    pub dataset_file: String,
    pub text_field: String,
    pub extractor: NumberExtractor,
    pub workers: usize,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        let config = RunConfig::default();
        Self {
            dataset_file: config.dataset_file,
            text_field: config.text_field,
            extractor: NumberExtractor::default(),
            workers: 1,
        }
    }
}

impl CorpusOptions {
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dataset_file: config.dataset_file.clone(),
            text_field: config.text_field.clone(),
            extractor: config.extractor()?,
            workers: config.workers,
        })
    }
}

/// A category subdirectory found under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDir {
    pub name: String,
    pub path: PathBuf,
}

/// Why a category was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingFile(PathBuf),
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingFile(path) => write!(f, "{} not found", path.display()),
            SkipReason::Unreadable(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCategory {
    pub category: String,
    pub reason: SkipReason,
}

/// Outcome for a single category, in corpus order.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    Scanned {
        summary: CategorySummary,
        malformed: usize,
    },
    Skipped(SkippedCategory),
}

/// Everything the aggregator learned about a corpus.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorpusScan {
    /// Usable categories, sorted by name
    pub summaries: Vec<CategorySummary>,
    pub skipped: Vec<SkippedCategory>,
    /// Malformed lines skipped across all categories
    pub malformed_lines: usize,
}

/// List category directories under `root`, sorted by name.
///
/// Plain files at the top level are ignored.
pub fn discover_categories(root: &Path) -> Result<Vec<CategoryDir>, CorpusError> {
    if !root.exists() {
        return Err(CorpusError::RootMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(CorpusError::NotADirectory(root.to_path_buf()));
    }

    let read_dir_err = |source: std::io::Error| CorpusError::ReadDir {
        path: root.to_path_buf(),
        source,
    };

    let mut categories = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        categories.push(CategoryDir { name, path });
    }

    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}

/// Scan one category directory.
pub fn scan_category_dir(category: &CategoryDir, options: &CorpusOptions) -> CategoryOutcome {
    let dataset = category.path.join(&options.dataset_file);
    if !dataset.is_file() {
        warn!(
            "{} not found, skipping {}",
            dataset.display(),
            category.name
        );
        return CategoryOutcome::Skipped(SkippedCategory {
            category: category.name.clone(),
            reason: SkipReason::MissingFile(dataset),
        });
    }

    info!("Processing {}...", category.name);
    match scan_file(&dataset, &options.extractor, &options.text_field) {
        Ok(report) => CategoryOutcome::Scanned {
            summary: CategorySummary::new(category.name.clone(), report.counts),
            malformed: report.malformed,
        },
        Err(e) => {
            warn!("Skipping {}: {}", category.name, e);
            CategoryOutcome::Skipped(SkippedCategory {
                category: category.name.clone(),
                reason: SkipReason::Unreadable(e.to_string()),
            })
        }
    }
}

/// Scan every category under `root`.
pub fn aggregate(root: &Path, options: &CorpusOptions) -> Result<CorpusScan, CorpusError> {
    aggregate_with_progress(root, options, |_| {})
}

/// Like [`aggregate`], calling `on_category` as each category finishes.
///
/// With several workers `on_category` runs concurrently and in no particular
/// order; the returned [`CorpusScan`] is always in name order.
pub fn aggregate_with_progress<F>(
    root: &Path,
    options: &CorpusOptions,
    on_category: F,
) -> Result<CorpusScan, CorpusError>
where
    F: Fn(&CategoryOutcome) + Sync,
{
    let categories = discover_categories(root)?;
    if categories.is_empty() {
        return Err(CorpusError::NoCategories(root.to_path_buf()));
    }
    info!("Found {} category directories", categories.len());

    let scan_one = |category: &CategoryDir| {
        let outcome = scan_category_dir(category, options);
        on_category(&outcome);
        outcome
    };

    let outcomes: Vec<CategoryOutcome> = if options.workers <= 1 {
        categories.iter().map(scan_one).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()?;
        pool.install(|| categories.par_iter().map(scan_one).collect())
    };

    let mut corpus = CorpusScan::default();
    for outcome in outcomes {
        match outcome {
            CategoryOutcome::Scanned { summary, malformed } => {
                corpus.malformed_lines += malformed;
                corpus.summaries.push(summary);
            }
            CategoryOutcome::Skipped(skipped) => corpus.skipped.push(skipped),
        }
    }

    if corpus.summaries.is_empty() {
        return Err(CorpusError::NoUsableCategories {
            root: root.to_path_buf(),
            skipped: corpus.skipped.len(),
        });
    }

    Ok(corpus)
}
