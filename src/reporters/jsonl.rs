//! JSON Lines reporter
//!
//! One compact JSON object per line, one line per category. Number keys are
//! written as decimal-string object keys in ascending order.

use super::ReportError;
use crate::models::{CategoryRatios, CategorySummary};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::BufRead;

fn render_lines<T: Serialize>(items: &[T]) -> Result<String, ReportError> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

/// Render the counts artifact: category, totals and the full frequency table.
pub fn render_counts(summaries: &[CategorySummary]) -> Result<String, ReportError> {
    render_lines(summaries)
}

/// Render the ratios artifact: category and ratio table only.
pub fn render_ratios(ratios: &[CategoryRatios]) -> Result<String, ReportError> {
    render_lines(ratios)
}

fn read_lines<T: DeserializeOwned, R: BufRead>(reader: R) -> Result<Vec<T>, ReportError> {
    let mut items = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|source| ReportError::Parse {
            line: idx + 1,
            source,
        })?;
        items.push(item);
    }
    Ok(items)
}

/// Parse a counts artifact back into summaries.
pub fn read_counts<R: BufRead>(reader: R) -> Result<Vec<CategorySummary>, ReportError> {
    read_lines(reader)
}

/// Parse a ratios artifact back into ratio tables.
pub fn read_ratios<R: BufRead>(reader: R) -> Result<Vec<CategoryRatios>, ReportError> {
    read_lines(reader)
}
