//! Runtime configuration for the ETL pipeline.

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

pub const ENV_CONFIG_FILE: &str = "SUPERSTORE_CONFIG";
pub const ENV_SOURCE_URL: &str = "SUPERSTORE_SOURCE_URL";
pub const ENV_DATA_DIR: &str = "SUPERSTORE_DATA_DIR";
pub const ENV_RAW_NAME: &str = "SUPERSTORE_RAW_NAME";
pub const ENV_PROCESSED_NAME: &str = "SUPERSTORE_PROCESSED_NAME";
pub const ENV_FORCE: &str = "SUPERSTORE_FORCE";
pub const ENV_FETCH_TIMEOUT: &str = "SUPERSTORE_FETCH_TIMEOUT_SECS";

/// Where the dataset comes from and where its cached copies live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote spreadsheet to download.
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Root of the `raw/` and `processed/` cache directories.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the downloaded spreadsheet under `raw/`.
    /// The extension selects the reader used by the transformation stage.
    #[serde(default = "default_raw_name")]
    pub raw_name: String,

    /// File name of the processed CSV under `processed/`.
    #[serde(default = "default_processed_name")]
    pub processed_name: String,

    /// Regenerate the raw and processed files even if they are cached.
    #[serde(default)]
    pub force: bool,

    /// Upper bound on the whole HTTP request, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_source_url() -> String {
    "https://www.tableau.com/sites/default/files/2021-05/Sample%20-%20Superstore.xls".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_raw_name() -> String {
    "Superstore.xls".to_string()
}

fn default_processed_name() -> String {
    "Superstore.csv".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            data_dir: default_data_dir(),
            raw_name: default_raw_name(),
            processed_name: default_processed_name(),
            force: false,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Config {
    /// Build a config from `SUPERSTORE_*` environment variables, layered on top
    /// of the optional JSON file named by `SUPERSTORE_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG_FILE) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(v) = lookup(ENV_SOURCE_URL) {
            config.source_url = v;
        }
        if let Some(v) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_RAW_NAME) {
            config.raw_name = v;
        }
        if let Some(v) = lookup(ENV_PROCESSED_NAME) {
            config.processed_name = v;
        }
        if let Some(v) = lookup(ENV_FORCE) {
            config.force = parse_flag(&v).ok_or(ConfigError::InvalidValue {
                key: ENV_FORCE,
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_FETCH_TIMEOUT) {
            config.fetch_timeout_secs =
                v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_FETCH_TIMEOUT,
                    value: v.clone(),
                })?;
        }

        Ok(config)
    }

    /// Load a JSON config file; absent fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join("raw").join(&self.raw_name)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join("processed").join(&self.processed_name)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
