//! Per-query cache profile

use crate::cache::request::QueryOptions;
use crate::error::{CacheError, Result};
use std::time::Duration;

/// Caching configuration resolved for one in-flight query
///
/// Built when the query is finalized and handed to each interception phase.
/// Everything except the key is fixed at construction. The key starts as the
/// caller's prefix and is replaced once by `prefix + fingerprint` before the
/// first lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheProfile {
    key: Option<String>,
    prefix: Option<String>,
    lifetime: Duration,
    key_priorities: Vec<String>,
    log_queries: bool,
    log_file_path: Option<String>,
}

impl CacheProfile {
    /// Create a validated profile
    ///
    /// # Errors
    /// `InvalidConfiguration` when `lifetime` is `None`, or when
    /// `log_queries` is set without a non-empty `log_file_path`.
    pub fn new(
        key: Option<String>,
        lifetime: Option<Duration>,
        key_priorities: Option<Vec<String>>,
        log_queries: bool,
        log_file_path: Option<String>,
    ) -> Result<Self> {
        let lifetime = lifetime.ok_or_else(|| {
            CacheError::InvalidConfiguration("a lifetime is required for the cache".to_string())
        })?;

        let log_file_path = log_file_path.filter(|path| !path.is_empty());
        if log_queries && log_file_path.is_none() {
            return Err(CacheError::InvalidConfiguration(
                "query logging is enabled but no log file path was given".to_string(),
            ));
        }

        Ok(Self {
            prefix: key.clone(),
            key,
            lifetime,
            key_priorities: key_priorities.unwrap_or_default(),
            log_queries,
            log_file_path,
        })
    }

    /// Build a profile from query options
    ///
    /// Returns `Ok(None)` when the query did not ask for caching.
    /// `fallback_log_path` is used when logging is requested without a path.
    pub fn from_options(
        options: &QueryOptions,
        fallback_log_path: Option<&str>,
    ) -> Result<Option<Self>> {
        if options.cache_lifetime.is_none() {
            return Ok(None);
        }

        let log_queries = options.log_queries.unwrap_or(false);
        let log_file_path = options
            .log_queries_file_path
            .clone()
            .filter(|path| !path.is_empty())
            .or_else(|| {
                if log_queries {
                    fallback_log_path.map(str::to_string)
                } else {
                    None
                }
            });

        Self::new(
            options.cache_key.clone(),
            options.cache_lifetime,
            options.cache_key_priorities.clone(),
            log_queries,
            log_file_path,
        )
        .map(Some)
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Replace the key (not re-validated)
    ///
    /// The engine calls this once per query with the derived key. The prefix
    /// given at construction stays available through [`Self::prefix`].
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }

    /// Key prefix as given at construction, empty when absent
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// Whether the key was replaced by a derived key
    pub fn is_key_derived(&self) -> bool {
        self.key != self.prefix
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn key_priorities(&self) -> &[String] {
        &self.key_priorities
    }

    pub fn log_queries(&self) -> bool {
        self.log_queries
    }

    pub fn log_file_path(&self) -> Option<&str> {
        self.log_file_path.as_deref()
    }
}
