//! numtally - number token frequency analysis
//!
//! Scans a corpus of per-category JSONL datasets, counts the 3-digit numbers
//! found in each record's text, and compares every category's counts against
//! the corpus-wide mean for each number.
//!
//! The pipeline, leaf first:
//! - [`extract`] pulls in-range numbers out of text
//! - [`scan`] tallies one category's dataset into a [`models::FrequencyTable`]
//! - [`corpus`] discovers and scans every category
//! - [`ratio`] derives count-to-mean ratios
//! - [`reporters`] writes the counts and ratios artifacts

pub mod cli;
pub mod config;
pub mod corpus;
pub mod extract;
pub mod models;
pub mod ratio;
pub mod reporters;
pub mod scan;
