//! Core type definitions for the interceptor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type
pub type CacheKey = String;

/// Where a cached response was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupSource {
    /// The profile's own derived key
    Primary,

    /// An alternate namespace from the key priority list
    Priority { prefix: String },
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupSource::Primary => write!(f, "primary"),
            LookupSource::Priority { prefix } => write!(f, "priority:{}", prefix),
        }
    }
}

/// Result of the pre-execution phase
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<R> {
    /// Serve this response and skip execution
    Hit { response: R, source: LookupSource },

    /// Execute the request normally
    Miss,
}

impl<R> Decision<R> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Decision::Hit { .. })
    }

    pub fn into_response(self) -> Option<R> {
        match self {
            Decision::Hit { response, .. } => Some(response),
            Decision::Miss => None,
        }
    }
}

/// Counters for interceptor activity
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Responses served from the primary key
    pub hits: u64,

    /// Responses served from a priority fallback key
    pub fallback_hits: u64,

    /// Cacheable requests that had to be executed
    pub misses: u64,

    /// Stored payloads that failed to decode
    pub corrupt: u64,

    /// Requests skipped because of a non-select handler
    pub bypassed: u64,

    /// Responses written to the store
    pub saves: u64,

    /// Store writes that failed
    pub save_failures: u64,

    /// Query log appends that failed
    pub log_failures: u64,
}

impl CacheStats {
    /// Total hits regardless of source
    pub fn total_hits(&self) -> u64 {
        self.hits + self.fallback_hits
    }

    /// Cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.total_hits() as f64 / total as f64) * 100.0
        }
    }

    /// Cache miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, fallback_hits: {}, misses: {}, hit_rate: {:.2}%, saves: {}, failures: {} }}",
            self.hits,
            self.fallback_hits,
            self.misses,
            self.hit_rate(),
            self.saves,
            self.save_failures + self.log_failures
        )
    }
}
