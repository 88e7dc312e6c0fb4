//! Count-to-mean ratios
//!
//! For every number seen in any category, the corpus mean is the average of
//! that number's count over all categories, with categories that never saw it
//! counting as zero. A category's ratio for the number is its own count over
//! that mean. Means of zero give a ratio of exactly 0.0.

use crate::models::{CategoryRatios, CategorySummary, RatioTable};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Union of numbers observed in any category, ascending.
pub fn observed_numbers(summaries: &[CategorySummary]) -> BTreeSet<u32> {
    summaries
        .iter()
        .flat_map(|s| s.counts().numbers())
        .collect()
}

/// Mean count per observed number across all categories.
///
/// Empty input gives an empty map.
pub fn corpus_means(summaries: &[CategorySummary]) -> BTreeMap<u32, f64> {
    if summaries.is_empty() {
        return BTreeMap::new();
    }
    let categories = summaries.len() as f64;

    observed_numbers(summaries)
        .into_iter()
        .map(|number| {
            let total: u64 = summaries
                .iter()
                .map(|s| s.counts().get_or_default(number))
                .sum();
            (number, total as f64 / categories)
        })
        .collect()
}

/// `count / mean`, or 0.0 when the mean is not positive.
pub fn ratio(count: u64, mean: f64) -> f64 {
    if mean > 0.0 {
        count as f64 / mean
    } else {
        0.0
    }
}

/// Ratio tables for every category, in the order given.
///
/// Each table has an entry for every observed number, including numbers the
/// category itself never produced.
pub fn compute_ratios(summaries: &[CategorySummary]) -> Vec<CategoryRatios> {
    let means = corpus_means(summaries);
    info!("Calculating ratios for {} unique numbers", means.len());

    summaries
        .iter()
        .map(|summary| {
            let mut ratios = RatioTable::new();
            for (&number, &mean) in &means {
                ratios.insert(number, ratio(summary.counts().get_or_default(number), mean));
            }
            CategoryRatios {
                category: summary.category().to_string(),
                ratios,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrequencyTable;

    const EPS: f64 = 1e-9;

    fn summary(name: &str, counts: &[(u32, u64)]) -> CategorySummary {
        CategorySummary::new(name, counts.iter().copied().collect::<FrequencyTable>())
    }

    #[test]
    fn test_two_category_example() {
        // An explicit zero count still puts 200 in the observed set
        let a = summary("A", &[(100, 2), (200, 0)]);
        let b = summary("B", &[(100, 4), (300, 1)]);
        let summaries = vec![a, b];

        let means = corpus_means(&summaries);
        assert_eq!(means.keys().copied().collect::<Vec<_>>(), vec![100, 200, 300]);
        assert!((means[&100] - 3.0).abs() < EPS);
        assert_eq!(means[&200], 0.0);
        assert!((means[&300] - 0.5).abs() < EPS);

        let ratios = compute_ratios(&summaries);
        assert_eq!(ratios[0].category, "A");
        assert_eq!(ratios[1].category, "B");

        let a = &ratios[0].ratios;
        let b = &ratios[1].ratios;
        assert!((a.get(100).expect("A/100") - 2.0 / 3.0).abs() < EPS);
        assert!((b.get(100).expect("B/100") - 4.0 / 3.0).abs() < EPS);
        assert_eq!(a.get(200), Some(0.0));
        assert_eq!(b.get(200), Some(0.0));
        assert_eq!(a.get(300), Some(0.0));
        assert!((b.get(300).expect("B/300") - 2.0).abs() < EPS);
    }

    #[test]
    fn test_missing_numbers_get_entries() {
        let summaries = vec![
            summary("a", &[(111, 3)]),
            summary("b", &[(222, 1)]),
            summary("c", &[]),
        ];
        let ratios = compute_ratios(&summaries);
        for entry in &ratios {
            assert_eq!(entry.ratios.len(), 2, "{} should cover all numbers", entry.category);
        }
        // mean(111) = 1.0, so a holds 3x and the others 0x
        assert!((ratios[0].ratios.get(111).expect("a/111") - 3.0).abs() < EPS);
        assert_eq!(ratios[1].ratios.get(111), Some(0.0));
        assert_eq!(ratios[2].ratios.get(111), Some(0.0));
    }

    #[test]
    fn test_ratio_times_mean_recovers_count() {
        let summaries = vec![
            summary("one", &[(101, 7), (555, 2), (999, 13)]),
            summary("two", &[(101, 1), (555, 9)]),
            summary("three", &[(999, 4), (321, 6)]),
        ];
        let means = corpus_means(&summaries);
        let ratios = compute_ratios(&summaries);
        for (summary, entry) in summaries.iter().zip(&ratios) {
            for (number, r) in entry.ratios.iter() {
                let mean = means[&number];
                assert!(mean > 0.0);
                let count = summary.counts().get_or_default(number) as f64;
                assert!((r * mean - count).abs() < 1e-9, "{}/{}", entry.category, number);
            }
        }
    }

    #[test]
    fn test_mean_matches_hand_computation() {
        let summaries = vec![
            summary("a", &[(400, 5)]),
            summary("b", &[(400, 1)]),
            summary("c", &[(500, 2)]),
            summary("d", &[]),
        ];
        let means = corpus_means(&summaries);
        assert!((means[&400] - 6.0 / 4.0).abs() < EPS);
        assert!((means[&500] - 2.0 / 4.0).abs() < EPS);
    }

    #[test]
    fn test_single_category_ratios_are_one() {
        let summaries = vec![summary("solo", &[(123, 4), (456, 1)])];
        let ratios = compute_ratios(&summaries);
        for (_, r) in ratios[0].ratios.iter() {
            assert!((r - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(corpus_means(&[]).is_empty());
        assert!(compute_ratios(&[]).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let summaries = vec![
            summary("x", &[(700, 3), (701, 1)]),
            summary("y", &[(700, 1), (702, 8)]),
        ];
        assert_eq!(compute_ratios(&summaries), compute_ratios(&summaries));
    }
}
