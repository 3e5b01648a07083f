//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `ACTLOG_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data loading configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for `*.csv` log files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Cap on loaded records; 0 means unlimited
    #[serde(default)]
    pub max_records: usize,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("actlog").join("data"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_records: 0,
        }
    }
}

impl DataConfig {
    /// The record cap as an option (`max_records = 0` disables the cap)
    pub fn record_cap(&self) -> Option<usize> {
        if self.max_records == 0 {
            None
        } else {
            Some(self.max_records)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("actlog").join("config.toml")),
            Some(PathBuf::from("./actlog.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("ACTLOG_DATA_DIR") {
            self.data.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(max_records) = std::env::var("ACTLOG_MAX_RECORDS") {
            if let Ok(n) = max_records.parse() {
                self.data.max_records = n;
            }
        }

        if let Ok(level) = std::env::var("ACTLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ACTLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Actlog Configuration
#
# Environment variables override these settings:
# - ACTLOG_DATA_DIR
# - ACTLOG_MAX_RECORDS
# - ACTLOG_LOG_LEVEL
# - ACTLOG_LOG_FORMAT

[data]
# Directory scanned for .csv log files
data_dir = "./data"

# Abort a load once this many records have been read (0 = unlimited)
max_records = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
