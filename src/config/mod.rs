//! Configuration for a crash analytics run.
//!
//! Paths are read from a YAML document with a `Data` section naming the six
//! input tables and an `Output` section naming one destination per analysis.
//! Reader behaviour is configured separately through [`CsvLoaderConfig`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// File name the command line insists on before a run starts
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Tokens read as missing values, mirroring common spreadsheet exports
pub const DEFAULT_NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Paths to the six input tables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataPaths {
    pub charges: PathBuf,
    pub damages: PathBuf,
    pub endorses: PathBuf,
    pub persons: PathBuf,
    pub units: PathBuf,
    pub restricts: PathBuf,
}

/// Destination of each analysis result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputPaths {
    pub analytics1: PathBuf,
    pub analytics2: PathBuf,
    pub analytics3: PathBuf,
    pub analytics4: PathBuf,
    pub analytics5: PathBuf,
    pub analytics6: PathBuf,
    pub analytics7: PathBuf,
    pub analytics8: PathBuf,
}

impl OutputPaths {
    /// Look up a destination by its key (`analytics1` .. `analytics8`)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Path> {
        let path = match key {
            "analytics1" => &self.analytics1,
            "analytics2" => &self.analytics2,
            "analytics3" => &self.analytics3,
            "analytics4" => &self.analytics4,
            "analytics5" => &self.analytics5,
            "analytics6" => &self.analytics6,
            "analytics7" => &self.analytics7,
            "analytics8" => &self.analytics8,
            _ => return None,
        };
        Some(path.as_path())
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(rename = "Data")]
    pub data: DataPaths,
    #[serde(rename = "Output")]
    pub output: OutputPaths,
}

impl AnalyticsConfig {
    /// Parse a configuration document
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::Config {
                path: origin.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Read and parse the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content, path)?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }
}

/// Configuration for the CSV table loader
#[derive(Debug, Clone)]
pub struct CsvLoaderConfig {
    /// Rows per record batch while reading
    pub batch_size: usize,
    /// Rows used for schema inference, `None` scans the whole file
    pub infer_rows: Option<usize>,
    /// Field values read as null
    pub null_tokens: Vec<String>,
}

impl Default for CsvLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            infer_rows: None,
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CsvLoaderConfig {
    /// Anchored pattern matching any of the null tokens
    pub fn null_regex(&self) -> Result<Regex> {
        let alternatives = self
            .null_tokens
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("^(?:{alternatives})$"))
            .with_context(|| "Failed to build null token pattern")
    }
}
