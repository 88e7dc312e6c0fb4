//! CLI definition and entry point

mod analyze;

use crate::config::{ConfigLayer, MAX_WORKERS};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

/// numtally - number token frequencies and ratios per category
#[derive(Parser, Debug)]
#[command(name = "numtally")]
#[command(
    version,
    about = "Count 3-digit numbers in per-category JSONL datasets and compare each category against the corpus mean",
    long_about = "numtally scans a corpus directory holding one subdirectory per category. \
Each category's dataset file is read line by line, numbers are extracted from the \
text field of every record, and two JSON Lines artifacts are written: raw counts \
per category, and each category's count-to-corpus-mean ratio for every number.",
    after_help = "\
Examples:
  numtally data/preference_numbers/
  numtally data/ --output-counts counts.jsonl --output-ratios ratios.jsonl
  numtally data/ --text-field answer --min-value 10 --max-value 99
  numtally data/ --config numtally.toml --workers 4"
)]
pub struct Cli {
    /// Directory containing one subdirectory per category
    pub corpus_root: PathBuf,

    /// Output JSONL file for counts [default: number_token_counts.jsonl]
    #[arg(long)]
    pub output_counts: Option<PathBuf>,

    /// Output JSONL file for ratios [default: number_token_ratios.jsonl]
    #[arg(long)]
    pub output_ratios: Option<PathBuf>,

    /// Dataset file name inside each category directory [default: filtered_dataset.jsonl]
    #[arg(long)]
    pub dataset_file: Option<String>,

    /// Record field to extract numbers from [default: completion]
    #[arg(long)]
    pub text_field: Option<String>,

    /// Smallest number to count [default: 100]
    #[arg(long)]
    pub min_value: Option<u32>,

    /// Largest number to count [default: 999]
    #[arg(long)]
    pub max_value: Option<u32>,

    /// Number of parallel workers (1-64) [default: 8]
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Config file (default: numtally.toml in the corpus root, if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

impl Cli {
    /// Settings given explicitly on the command line.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            dataset_file: self.dataset_file.clone(),
            text_field: self.text_field.clone(),
            min_value: self.min_value,
            max_value: self.max_value,
            output_counts: self.output_counts.clone(),
            output_ratios: self.output_ratios.clone(),
            workers: self.workers,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let layer = cli.config_layer();
    analyze::run(&cli.corpus_root, cli.config.as_deref(), layer)
}
