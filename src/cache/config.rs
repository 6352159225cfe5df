//! Configuration for the decision engine

use crate::cache::fingerprint::SELECT_HANDLER_PREFIX;
use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the select handler prefix
pub const ENV_SELECT_PREFIX: &str = "SEARCH_CACHE_SELECT_PREFIX";
/// Environment variable toggling metrics collection (`true`/`false`)
pub const ENV_METRICS: &str = "SEARCH_CACHE_METRICS";
/// Environment variable naming the fallback query log file
pub const ENV_LOG_FILE: &str = "SEARCH_CACHE_LOG_FILE";

/// Configuration for the cache decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lowercase prefix identifying read-only handlers
    pub select_handler_prefix: String,

    /// Collect hit/miss counters
    pub enable_metrics: bool,

    /// Log file used when a query enables logging without naming a file
    pub default_log_file_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            select_handler_prefix: SELECT_HANDLER_PREFIX.to_string(),
            enable_metrics: true,
            default_log_file_path: None,
        }
    }
}

impl EngineConfig {
    /// Create a new builder for engine configuration
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = Self::builder();

        if let Ok(prefix) = std::env::var(ENV_SELECT_PREFIX) {
            builder = builder.select_handler_prefix(prefix);
        }

        if let Ok(metrics) = std::env::var(ENV_METRICS) {
            let enabled = metrics.trim().parse::<bool>().map_err(|_| {
                CacheError::ConfigError(format!(
                    "{} must be true or false, got '{}'",
                    ENV_METRICS, metrics
                ))
            })?;
            builder = builder.enable_metrics(enabled);
        }

        if let Ok(path) = std::env::var(ENV_LOG_FILE) {
            if !path.is_empty() {
                builder = builder.default_log_file_path(path);
            }
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.select_handler_prefix.is_empty() {
            return Err(CacheError::ConfigError(
                "select_handler_prefix must not be empty".to_string(),
            ));
        }

        if self.select_handler_prefix != self.select_handler_prefix.to_lowercase() {
            return Err(CacheError::ConfigError(
                "select_handler_prefix must be lowercase".to_string(),
            ));
        }

        if matches!(self.default_log_file_path.as_deref(), Some("")) {
            return Err(CacheError::ConfigError(
                "default_log_file_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for engine configuration
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    select_handler_prefix: Option<String>,
    enable_metrics: Option<bool>,
    default_log_file_path: Option<String>,
}

impl EngineConfigBuilder {
    /// Set the handler prefix treated as read-only
    pub fn select_handler_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.select_handler_prefix = Some(prefix.into());
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Set the fallback query log file
    pub fn default_log_file_path(mut self, path: impl Into<String>) -> Self {
        self.default_log_file_path = Some(path.into());
        self
    }

    /// Build and validate the engine configuration
    pub fn build(self) -> Result<EngineConfig> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            select_handler_prefix: self
                .select_handler_prefix
                .unwrap_or(defaults.select_handler_prefix),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
            default_log_file_path: self
                .default_log_file_path
                .or(defaults.default_log_file_path),
        };

        config.validate()?;
        Ok(config)
    }
}
