//! Configuration for a numtally run
//!
//! Settings come from three layers, lowest priority first:
//! - Built-in defaults
//! - `numtally.toml` in the corpus root (or a file passed with `--config`)
//! - Command-line flags
//!
//! # Configuration Format
//!
//! ```toml
//! # numtally.toml
//! dataset_file = "filtered_dataset.jsonl"
//! text_field = "completion"
//! min_value = 100
//! max_value = 999
//! output_counts = "number_token_counts.jsonl"
//! output_ratios = "number_token_ratios.jsonl"
//! workers = 8
//! ```

mod run_config;

pub use run_config::{
    load_config_file, ConfigError, ConfigLayer, RunConfig, CONFIG_FILE_NAME, MAX_WORKERS,
};
