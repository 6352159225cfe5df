//! Error types for cache interception
//!
//! Only configuration problems are surfaced to callers as hard failures.
//! Store, codec and query-log failures are produced by collaborators and the
//! engine downgrades them to cache misses or warnings.

use thiserror::Error;

/// Main error type for the select-query cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Profile built from inconsistent query options (missing lifetime,
    /// query logging without a log file)
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// Engine used before a cache store was bound
    #[error("The cache store was not set")]
    NotConfigured,

    /// Failure reported by the key/value store
    #[error("Cache store error: {0}")]
    StoreError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Query log I/O failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    /// Whether the error means the caller misconfigured the cache layer
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidConfiguration(_)
                | CacheError::NotConfigured
                | CacheError::ConfigError(_)
        )
    }
}

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Other(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
