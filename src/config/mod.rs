use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use crate::errors::{ClassifierError, ClassifierResult};
use defaults::*;
use duration_serde::duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where the signature database is downloaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL returning the signature database in ini format
    #[serde(default = "default_ini_url")]
    pub ini_url: String,
    /// Base URL prepended to every `ua_info_url`
    #[serde(default = "default_info_url")]
    pub info_url: String,
    #[serde(default = "default_connect_timeout", with = "duration")]
    pub connect_timeout: Duration,
    /// Upper bound for a whole download, so a stalled refresh eventually fails
    #[serde(default = "default_request_timeout", with = "duration")]
    pub request_timeout: Duration,
}

/// In-memory result cache sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Location of the persisted compiled table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_cache_file_name")]
    pub file_name: String,
}

// Source defaults
fn default_ini_url() -> String {
    DEFAULT_INI_URL.to_string()
}

fn default_info_url() -> String {
    DEFAULT_INFO_URL.to_string()
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

// Storage defaults
fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_cache_file_name() -> String {
    DEFAULT_CACHE_FILE_NAME.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            ini_url: default_ini_url(),
            info_url: default_info_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            file_name: default_cache_file_name(),
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config: Self = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the classifier cannot run with
    pub fn validate(&self) -> ClassifierResult<()> {
        if self.cache.capacity == 0 {
            return Err(ClassifierError::configuration(
                "cache.capacity must be at least 1",
            ));
        }
        for (field, value) in [
            ("source.ini_url", &self.source.ini_url),
            ("source.info_url", &self.source.info_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                ClassifierError::configuration(format!("{field} is not a valid URL: {e}"))
            })?;
        }
        if self.storage.file_name.trim().is_empty() {
            return Err(ClassifierError::configuration(
                "storage.file_name must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.source.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.source.request_timeout, Duration::from_secs(60));
        assert_eq!(config.storage.cache_dir, PathBuf::from("./data"));
        assert_eq!(config.storage.file_name, "uasparser2_cache");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            capacity = 25

            [source]
            connect_timeout = "3s"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.capacity, 25);
        assert_eq!(config.source.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.source.info_url, DEFAULT_INFO_URL);
        assert_eq!(config.storage.file_name, DEFAULT_CACHE_FILE_NAME);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.cache.capacity = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.capacity"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let mut config = Config::default();
        config.source.ini_url = "not a url".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source.ini_url"));
    }

    #[test]
    fn test_load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::load_from_file(path).unwrap();
        assert_eq!(config.cache.capacity, DEFAULT_CACHE_CAPACITY);

        let written = std::fs::read_to_string(path).unwrap();
        let reloaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(reloaded.source.ini_url, DEFAULT_INI_URL);
        assert_eq!(reloaded.source.request_timeout, Duration::from_secs(60));
    }
}
