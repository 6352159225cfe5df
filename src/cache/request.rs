//! Query options and outgoing requests seen by the interceptor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Caching options attached to a query by the query builder
///
/// All fields are optional. A query only opts into caching when
/// `cache_lifetime` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Cache key prefix (e.g. a user or bot namespace)
    #[serde(default)]
    pub cache_key: Option<String>,

    /// Lifetime of the cached response
    #[serde(default)]
    pub cache_lifetime: Option<Duration>,

    /// Key prefixes ordered from highest to lowest lookup priority
    #[serde(default)]
    pub cache_key_priorities: Option<Vec<String>>,

    /// Append every cacheable request to a log file
    #[serde(default)]
    pub log_queries: Option<bool>,

    /// Target file for query logging
    #[serde(default)]
    pub log_queries_file_path: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn cache_lifetime(mut self, lifetime: Duration) -> Self {
        self.cache_lifetime = Some(lifetime);
        self
    }

    pub fn cache_key_priorities<I, S>(mut self, priorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache_key_priorities = Some(priorities.into_iter().map(Into::into).collect());
        self
    }

    pub fn log_queries(mut self, enabled: bool) -> Self {
        self.log_queries = Some(enabled);
        self
    }

    pub fn log_queries_file_path(mut self, path: impl Into<String>) -> Self {
        self.log_queries_file_path = Some(path.into());
        self
    }

    /// Whether the query asked for caching at all
    pub fn is_cacheable(&self) -> bool {
        self.cache_lifetime.is_some()
    }
}

/// A request about to be sent to the search backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Request URI including the handler path and URL parameters
    pub uri: String,

    /// Raw POST body, empty for GET requests
    pub raw_body: Vec<u8>,

    /// Encoded query string
    pub query_string: String,

    /// Name of the backend handler (e.g. `select`, `update`)
    pub handler: String,
}

impl SearchRequest {
    pub fn new(handler: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            raw_body: Vec::new(),
            query_string: String::new(),
            handler: handler.into(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.raw_body = body.into();
        self
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// Body rendered as text for logging
    pub fn body_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_body)
    }
}
