//! The analysis run: scan the corpus, compute ratios, write both artifacts.

use crate::config::{ConfigLayer, RunConfig};
use crate::corpus::{aggregate_with_progress, CorpusOptions, CorpusScan};
use crate::ratio::{compute_ratios, observed_numbers};
use crate::reporters::{write_reports, ReportPaths};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;

pub(super) fn run(corpus_root: &Path, config_path: Option<&Path>, cli: ConfigLayer) -> Result<()> {
    let config = RunConfig::resolve(corpus_root, config_path, cli)
        .context("Failed to load configuration")?;
    debug!("Resolved configuration: {:?}", config);

    let options = CorpusOptions::from_config(&config)?;
    let corpus = scan_corpus(corpus_root, &options)?;
    print_category_summaries(&corpus);

    let ratios = compute_ratios(&corpus.summaries);
    let unique_numbers = observed_numbers(&corpus.summaries).len();
    println!(
        "\nCalculating ratios for {} unique numbers...",
        style(unique_numbers).cyan()
    );

    let paths = ReportPaths {
        counts: config.output_counts.clone(),
        ratios: config.output_ratios.clone(),
    };
    write_reports(&paths, &corpus.summaries, &ratios).context("Failed to write reports")?;

    println!("\nCounts written to {}", paths.counts.display());
    println!("Ratios written to {}", paths.ratios.display());
    println!(
        "{}Processed {} categories",
        style("✓ ").green(),
        style(corpus.summaries.len()).cyan()
    );

    Ok(())
}

fn scan_corpus(corpus_root: &Path, options: &CorpusOptions) -> Result<CorpusScan> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} Scanning categories: {pos} done")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = aggregate_with_progress(corpus_root, options, |_| bar.inc(1));
    bar.finish_and_clear();

    let corpus = result?;
    println!(
        "Found {} category directories",
        style(corpus.summaries.len() + corpus.skipped.len()).cyan()
    );
    Ok(corpus)
}

fn print_category_summaries(corpus: &CorpusScan) {
    for summary in &corpus.summaries {
        println!("Processing {}...", summary.category());
        println!(
            "  - Found {} total numbers, {} unique numbers",
            summary.total_count(),
            summary.unique_count()
        );
    }

    for skipped in &corpus.skipped {
        println!(
            "{}Skipped {}: {}",
            style("⚠ ").yellow(),
            skipped.category,
            skipped.reason
        );
    }

    if corpus.malformed_lines > 0 {
        println!(
            "{}{} malformed lines were skipped",
            style("⚠ ").yellow(),
            corpus.malformed_lines
        );
    }
}
