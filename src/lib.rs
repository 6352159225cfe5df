//! # Search Query Cache (search-query-cache)
//!
//! A response cache for read-only queries sent to a search backend such as
//! Solr. It plugs into a request pipeline at three points and decides, per
//! request, whether a stored response can be served instead of contacting
//! the backend.
//!
//! ## Features
//!
//! - Deterministic cache keys from request URI and body
//! - Per-query lifetime, key prefix and namespace priorities
//! - Fallback lookups into higher-priority namespaces (e.g. anonymous traffic)
//! - Pluggable async key/value store
//! - Optional query logging to a file
//!
//! ## Manual Phases
//!
//! Pipelines that already expose hooks call the engine directly.
//!
//! ```no_run
//! use search_query_cache::cache::{
//!     CacheDecisionEngine, Decision, EngineConfig, MemoryStore, QueryOptions, SearchRequest,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = CacheDecisionEngine::with_store(
//!         EngineConfig::from_env()?,
//!         Arc::new(MemoryStore::new()),
//!     );
//!
//!     let options = QueryOptions::new()
//!         .cache_key("user_42_")
//!         .cache_lifetime(Duration::from_secs(60))
//!         .cache_key_priorities(["user_", "bot_"]);
//!
//!     // Query finalized
//!     let mut profile = engine.on_query_finalized(&options)?;
//!
//!     let request = SearchRequest::new("select", "/solr/select?q=*:*");
//!
//!     // Before dispatch
//!     match engine.on_before_execute::<serde_json::Value>(&mut profile, &request).await? {
//!         Decision::Hit { response, source } => {
//!             println!("cached ({}): {}", source, response);
//!         }
//!         Decision::Miss => {
//!             let response = serde_json::json!({"numFound": 0});
//!             // After the response arrived
//!             engine.on_after_execute(&mut profile, &request, &response).await?;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;

// Re-export main types for convenience
pub use cache::{
    CacheDecisionEngine, CacheKey, CacheProfile, CacheStats, CacheStore, CachedQuery, Decision,
    Decoded, EngineConfig, EngineConfigBuilder, LookupSource, MemoryStore, QueryOptions,
    SearchRequest,
};
pub use error::{CacheError, Result};
