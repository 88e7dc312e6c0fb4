use crate::extract::{ExtractError, NumberExtractor, DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Config file looked up in the corpus root when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "numtally.toml";

/// Upper bound on scanning threads
pub const MAX_WORKERS: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Range(#[from] ExtractError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// One partial layer of settings. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    /// Input file name inside each category directory
    pub dataset_file: Option<String>,
    /// Record field holding the text to scan
    pub text_field: Option<String>,
    pub min_value: Option<u32>,
    pub max_value: Option<u32>,
    pub output_counts: Option<PathBuf>,
    pub output_ratios: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub dataset_file: String,
    pub text_field: String,
    pub min_value: u32,
    pub max_value: u32,
    pub output_counts: PathBuf,
    pub output_ratios: PathBuf,
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset_file: "filtered_dataset.jsonl".to_string(),
            text_field: "completion".to_string(),
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            output_counts: PathBuf::from("number_token_counts.jsonl"),
            output_ratios: PathBuf::from("number_token_ratios.jsonl"),
            workers: 8,
        }
    }
}

impl RunConfig {
    /// Overlay `layer` on top of `self`.
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.dataset_file {
            self.dataset_file = v;
        }
        if let Some(v) = layer.text_field {
            self.text_field = v;
        }
        if let Some(v) = layer.min_value {
            self.min_value = v;
        }
        if let Some(v) = layer.max_value {
            self.max_value = v;
        }
        if let Some(v) = layer.output_counts {
            self.output_counts = v;
        }
        if let Some(v) = layer.output_ratios {
            self.output_ratios = v;
        }
        if let Some(v) = layer.workers {
            self.workers = v;
        }
    }

    /// Resolve settings for a corpus: defaults, then the config file, then `cli`.
    ///
    /// An explicit `config_path` must load. The implicit `numtally.toml` in
    /// `corpus_root` is optional, and a broken one is only warned about.
    pub fn resolve(
        corpus_root: &Path,
        config_path: Option<&Path>,
        cli: ConfigLayer,
    ) -> Result<Self, ConfigError> {
        let mut config = RunConfig::default();

        match config_path {
            Some(path) => config.merge(load_config_file(path)?),
            None => {
                let implicit = corpus_root.join(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    match load_config_file(&implicit) {
                        Ok(layer) => {
                            debug!("Loaded config from {}", implicit.display());
                            config.merge(layer);
                        }
                        Err(e) => warn!("Ignoring {}: {}", implicit.display(), e),
                    }
                } else {
                    debug!("No {} in corpus root, using defaults", CONFIG_FILE_NAME);
                }
            }
        }

        config.merge(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extractor()?;
        if self.dataset_file.trim().is_empty() {
            return Err(ConfigError::Invalid("dataset_file must not be empty".into()));
        }
        if self.text_field.is_empty() {
            return Err(ConfigError::Invalid("text_field must not be empty".into()));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        Ok(())
    }

    /// Extractor for the configured number range.
    pub fn extractor(&self) -> Result<NumberExtractor, ConfigError> {
        Ok(NumberExtractor::new(self.min_value, self.max_value)?)
    }
}

/// Load one config layer from a TOML file.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
