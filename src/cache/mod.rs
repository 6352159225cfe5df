//! # Select-Query Caching Layer
//!
//! Intercepts read-only requests to a search backend and serves them from a
//! key/value store when an identical request was answered before.
//!
//! ## Features
//!
//! - **Request fingerprinting**: SHA1 over request URI and raw body
//! - **Namespaced keys**: caller-supplied prefixes (per user, per bot, ...)
//! - **Priority fallback**: probe alternate namespaces on a miss
//! - **Query logging**: optional append-only log of cacheable requests
//! - **Soft failures**: store errors and corrupt entries never fail a query
//!
//! ## Lifecycle
//!
//! Each query passes through three phases, driven by the surrounding
//! pipeline or by a [`CachedQuery`] scope:
//! - Phase A: query options → [`CacheProfile`]
//! - Phase B: before dispatch → cached response or miss
//! - Phase C: after execution → store the response
//!
//! ## Example
//!
//! ```rust
//! use search_query_cache::cache::{
//!     CacheDecisionEngine, EngineConfig, MemoryStore, QueryOptions, SearchRequest,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = CacheDecisionEngine::with_store(
//!     EngineConfig::default(),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let options = QueryOptions::new()
//!     .cache_key("bot_")
//!     .cache_lifetime(Duration::from_secs(300));
//! let request = SearchRequest::new("select", "/solr/products/select?q=lamp");
//!
//! let docs: Vec<String> = engine
//!     .scope(&options)?
//!     .execute(&request, || async {
//!         Ok::<_, anyhow::Error>(vec!["lamp-1".to_string()])
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod fingerprint;
pub mod profile;
pub mod query_log;
pub mod request;
pub mod scope;
pub mod store;
pub mod types;

pub use codec::Decoded;
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::CacheDecisionEngine;
pub use fingerprint::{fingerprint, is_select_handler, SELECT_HANDLER_PREFIX};
pub use profile::CacheProfile;
pub use request::{QueryOptions, SearchRequest};
pub use scope::CachedQuery;
pub use store::{CacheStore, MemoryStore};
pub use types::{CacheKey, CacheStats, Decision, LookupSource};
