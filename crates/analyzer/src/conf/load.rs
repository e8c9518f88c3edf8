//! Load — config loading from file and environment variables.

use std::fs;
use std::path::Path;
use thiserror::Error;

use super::model::AnalyzerConfig;

const DEFAULT_CONFIG_PATH: &str = "logstat.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AnalyzerConfig {
    /// Load configuration from file and environment variables
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// An explicit `path` must exist; otherwise `LOGSTAT_CONFIG_FILE`
    /// (or `logstat.toml`) is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::from_file(path)?
            }
            None => {
                let config_path = std::env::var("LOGSTAT_CONFIG_FILE")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                if Path::new(&config_path).exists() {
                    tracing::info!("Loading configuration from: {}", config_path);
                    Self::from_file(Path::new(&config_path))?
                } else {
                    tracing::debug!("Config file not found at {}, using defaults", config_path);
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `LOGSTAT_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(log_file) = lookup("LOGSTAT_LOG_FILE") {
            self.log_file = log_file;
        }
        if let Some(strategy) = lookup("LOGSTAT_STRATEGY") {
            self.strategy = strategy.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(level) = lookup("LOGSTAT_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_bytes == 0 {
            return Err(ConfigError::Invalid("max_line_bytes must be > 0".to_string()));
        }
        if self.endpoints.is_empty() {
            return Err(ConfigError::Invalid("at least one endpoint must be configured".to_string()));
        }
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.method.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("endpoints[{}].method must not be empty", i)));
            }
            if endpoint.path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("endpoints[{}].path must not be empty", i)));
            }
        }
        Ok(())
    }
}
