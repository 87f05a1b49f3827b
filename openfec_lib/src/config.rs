//! Runtime configuration, read from a TOML file or the environment.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pagination::DEFAULT_CAP;

pub const DEFAULT_PER_PAGE: i64 = 20;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite mirror.
    pub database: PathBuf,
    /// Largest accepted `per_page`. 0 disables the cap.
    pub per_page_cap: i64,
    pub default_per_page: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("openfec.db"),
            per_page_cap: DEFAULT_CAP,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by `OPENFEC_DB`, `OPENFEC_PER_PAGE_CAP` and
    /// `OPENFEC_DEFAULT_PER_PAGE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = lookup("OPENFEC_DB") {
            config.database = PathBuf::from(path);
        }
        if let Some(cap) = env_i64(&lookup, "OPENFEC_PER_PAGE_CAP")? {
            config.per_page_cap = cap;
        }
        if let Some(per_page) = env_i64(&lookup, "OPENFEC_DEFAULT_PER_PAGE")? {
            config.default_per_page = per_page;
        }
        Ok(config)
    }

    /// The cap as the paginators expect it; `None` when disabled.
    pub fn cap(&self) -> Option<i64> {
        Some(self.per_page_cap).filter(|cap| *cap > 0)
    }
}

fn env_i64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<i64>, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
        None => Ok(None),
    }
}
