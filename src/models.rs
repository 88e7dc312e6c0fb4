//! Core data models for numtally
//!
//! These models flow through the whole pipeline: the scanner builds
//! [`FrequencyTable`]s, the corpus aggregator wraps them in
//! [`CategorySummary`]s, the ratio calculator derives [`RatioTable`]s,
//! and the reporters serialize both.
//!
//! Number keys are always `u32`. JSON object keys are rendered as decimal
//! strings on the wire and parsed back into integers, so there is exactly one
//! key representation in memory.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Occurrence counts per extracted number.
///
/// Lookups of absent numbers read as zero; incrementing an absent number
/// creates its entry. Iteration is in ascending number order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<u32, u64>);

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `number`, or 0 if it was never seen.
    pub fn get_or_default(&self, number: u32) -> u64 {
        self.0.get(&number).copied().unwrap_or(0)
    }

    /// Record one more occurrence of `number`.
    pub fn increment(&mut self, number: u32) {
        *self.0.entry(number).or_insert(0) += 1;
    }

    /// Record every number in `numbers`, duplicates included.
    pub fn record_all<I>(&mut self, numbers: I)
    where
        I: IntoIterator<Item = u32>,
    {
        for number in numbers {
            self.increment(number);
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct numbers seen.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.0.iter().map(|(&n, &c)| (n, c))
    }
}

impl FromIterator<(u32, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (u32, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-category counting result.
///
/// `total_count` and `unique_count` are derived from the table when the
/// summary is built, so they always agree with `counts`. Deserializing
/// rejects a record whose totals disagree with its table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    category: String,
    total_count: u64,
    unique_count: usize,
    counts: FrequencyTable,
}

impl CategorySummary {
    pub fn new(category: impl Into<String>, counts: FrequencyTable) -> Self {
        Self {
            category: category.into(),
            total_count: counts.total(),
            unique_count: counts.len(),
            counts,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    pub fn counts(&self) -> &FrequencyTable {
        &self.counts
    }
}

/// Wire shape of a [`CategorySummary`] before its totals are checked.
#[derive(Deserialize)]
struct SummaryRecord {
    category: String,
    total_count: u64,
    unique_count: usize,
    counts: FrequencyTable,
}

impl<'de> Deserialize<'de> for CategorySummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = SummaryRecord::deserialize(deserializer)?;
        let summary = CategorySummary::new(record.category, record.counts);
        if record.total_count != summary.total_count {
            return Err(de::Error::custom(format!(
                "total_count {} for '{}' does not match its counts (sum {})",
                record.total_count, summary.category, summary.total_count
            )));
        }
        if record.unique_count != summary.unique_count {
            return Err(de::Error::custom(format!(
                "unique_count {} for '{}' does not match its counts ({} numbers)",
                record.unique_count, summary.category, summary.unique_count
            )));
        }
        Ok(summary)
    }
}

/// Count-to-corpus-mean ratio per number, for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioTable(BTreeMap<u32, f64>);

impl RatioTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, number: u32, ratio: f64) {
        self.0.insert(number, ratio);
    }

    pub fn get(&self, number: u32) -> Option<f64> {
        self.0.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&n, &r)| (n, r))
    }
}

/// Ratios for one category, as written to the ratios artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRatios {
    pub category: String,
    pub ratios: RatioTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table_defaults_to_zero() {
        let mut table = FrequencyTable::new();
        assert_eq!(table.get_or_default(123), 0);
        table.increment(123);
        table.increment(123);
        assert_eq!(table.get_or_default(123), 2);
        assert_eq!(table.get_or_default(456), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_summary_totals_match_table() {
        let mut table = FrequencyTable::new();
        table.record_all([100, 200, 100, 999, 100]);
        let summary = CategorySummary::new("owl", table);
        assert_eq!(summary.total_count(), 5);
        assert_eq!(summary.unique_count(), 3);
        assert_eq!(
            summary.total_count(),
            summary.counts().iter().map(|(_, c)| c).sum::<u64>()
        );
    }

    #[test]
    fn test_counts_serialize_with_decimal_keys() {
        let table: FrequencyTable = [(300, 1), (100, 2)].into_iter().collect();
        let summary = CategorySummary::new("cat", table);
        let json = serde_json::to_string(&summary).expect("serialize summary");
        assert_eq!(
            json,
            r#"{"category":"cat","total_count":3,"unique_count":2,"counts":{"100":2,"300":1}}"#
        );
    }

    #[test]
    fn test_summary_with_inconsistent_totals_is_rejected() {
        let wrong_total =
            r#"{"category":"cat","total_count":7,"unique_count":2,"counts":{"100":2,"300":1}}"#;
        let err = serde_json::from_str::<CategorySummary>(wrong_total).expect_err("bad total");
        assert!(err.to_string().contains("total_count 7"), "{err}");

        let wrong_unique =
            r#"{"category":"cat","total_count":3,"unique_count":5,"counts":{"100":2,"300":1}}"#;
        let err = serde_json::from_str::<CategorySummary>(wrong_unique).expect_err("bad unique");
        assert!(err.to_string().contains("unique_count 5"), "{err}");

        let consistent =
            r#"{"category":"cat","total_count":3,"unique_count":2,"counts":{"100":2,"300":1}}"#;
        let summary: CategorySummary = serde_json::from_str(consistent).expect("consistent");
        assert_eq!(summary.total_count(), 3);
        assert_eq!(summary.counts().get_or_default(100), 2);
    }

    #[test]
    fn test_string_keys_parse_back_to_integers() {
        let table: FrequencyTable =
            serde_json::from_str(r#"{"512": 4, "100": 1}"#).expect("parse table");
        assert_eq!(table.get_or_default(512), 4);
        assert_eq!(table.numbers().collect::<Vec<_>>(), vec![100, 512]);
    }

    #[test]
    fn test_non_numeric_keys_rejected() {
        let parsed: Result<FrequencyTable, _> = serde_json::from_str(r#"{"abc": 1}"#);
        assert!(parsed.is_err());
    }
}
