//! Configuration management.
//!
//! Configuration is read from an optional TOML file and then overridden by
//! environment variables prefixed with `PUBMED_FETCH_`, using `__` between
//! section and key:
//!
//! ```toml
//! [eutils]
//! base_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! database = "pubmed"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [output]
//! directory = "results"
//! default_max_results = 10
//! ```
//!
//! ```bash
//! export PUBMED_FETCH_EUTILS__TIMEOUT_SECS=60
//! export PUBMED_FETCH_OUTPUT__DIRECTORY="./papers"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{SearchQuery, DEFAULT_MAX_RESULTS};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pubmed-fetch.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PUBMED_FETCH";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// E-utilities endpoint settings
    #[serde(default)]
    pub eutils: EutilsConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// NCBI E-utilities settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EutilsConfig {
    /// Base URL; `esearch.fcgi` and `efetch.fcgi` are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Entrez database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for EutilsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            database: default_database(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_database() -> String {
    "pubmed".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for CSV files when no explicit path is given
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Result cap used when the command line does not set one
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            default_max_results: default_max_results(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Config {
    /// Default CSV path for a query: `<directory>/<query_with_underscores>_results.csv`
    pub fn default_output_path(&self, query: &SearchQuery) -> PathBuf {
        self.output
            .directory
            .join(format!("{}_results.csv", query.file_stem()))
    }
}

/// Load configuration from a file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

/// Get the configuration from defaults plus environment overrides
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Find a configuration file in the default locations
///
/// Checks `./pubmed-fetch.toml`, then `<config dir>/pubmed-fetch/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pubmed-fetch").join("config.toml"))
        .filter(|path| path.is_file())
}
