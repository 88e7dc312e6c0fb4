//! Number extraction from free text
//!
//! Pulls standalone decimal numbers out of a completion and keeps the ones
//! inside a bounded range. A "standalone" number is a maximal digit run with a
//! word boundary on both sides, so `abc123` and `12_345` contribute nothing.
//!
//! Any Unicode decimal digit counts, so fullwidth `１２３` and Arabic-Indic
//! `٤٥٦` read as 123 and 456.

use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use thiserror::Error;

/// Smallest number kept by default (first 3-digit value)
pub const DEFAULT_MIN_VALUE: u32 = 100;

/// Largest number kept by default (last 3-digit value)
pub const DEFAULT_MAX_VALUE: u32 = 999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid number range: min {min} is greater than max {max}")]
    InvalidRange { min: u32, max: u32 },
}

fn number_pattern() -> &'static Regex {
    static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"\b\d+\b").expect("valid regex"))
}

fn is_decimal_digit(c: char) -> bool {
    static DIGIT_PATTERN: OnceLock<Regex> = OnceLock::new();
    let mut buf = [0u8; 4];
    DIGIT_PATTERN
        .get_or_init(|| Regex::new(r"^\d$").expect("valid regex"))
        .is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a decimal digit in any script.
///
/// Decimal digits are assigned in contiguous runs of ten starting at zero, and
/// adjacent runs (the mathematical digit styles) are also multiples of ten, so
/// the value is the offset from the start of the run modulo 10.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

/// Parse a digit run as base 10. `None` if it overflows `u32`.
fn parse_digits(run: &str) -> Option<u32> {
    run.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

/// Extracts in-range numbers from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberExtractor {
    range: RangeInclusive<u32>,
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self {
            range: DEFAULT_MIN_VALUE..=DEFAULT_MAX_VALUE,
        }
    }
}

impl NumberExtractor {
    pub fn new(min: u32, max: u32) -> Result<Self, ExtractError> {
        if min > max {
            return Err(ExtractError::InvalidRange { min, max });
        }
        Ok(Self { range: min..=max })
    }

    pub fn min(&self) -> u32 {
        *self.range.start()
    }

    pub fn max(&self) -> u32 {
        *self.range.end()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.range.contains(&value)
    }

    /// Numbers in `text` that fall inside the range, in order of occurrence.
    /// Duplicates are kept; tallying is the caller's job.
    pub fn extract(&self, text: &str) -> Vec<u32> {
        self.iter(text).collect()
    }

    /// Lazy form of [`extract`](Self::extract).
    pub fn iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = u32> + 'a {
        number_pattern()
            .find_iter(text)
            // Runs too long for u32 are out of any range we accept
            .filter_map(|m| parse_digits(m.as_str()))
            .filter(move |n| self.contains(*n))
    }
}

/// Extract 3-digit numbers (100 to 999) from `text`.
pub fn extract_numbers(text: &str) -> Vec<u32> {
    NumberExtractor::default().extract(text)
}
