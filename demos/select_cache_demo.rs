//! Select Cache Demo Application
//!
//! Runs a few queries through the cache against a fake backend and prints
//! which ones were served from the cache.
//!
//! Usage:
//!   cargo run --example select_cache_demo
//!
//! Environment variables:
//!   RUST_LOG                   - log filter (default: info)
//!   SEARCH_CACHE_SELECT_PREFIX - handler prefix treated as read-only (default: select)
//!   SEARCH_CACHE_METRICS       - collect counters (default: true)
//!   SEARCH_CACHE_LOG_FILE      - fallback query log file

use search_query_cache::cache::{
    CacheDecisionEngine, EngineConfig, MemoryStore, QueryOptions, SearchRequest,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("=== Select Cache Demo ===");

    let config = EngineConfig::from_env()?;
    let engine = CacheDecisionEngine::with_store(config, Arc::new(MemoryStore::new()));
    let backend_calls = AtomicUsize::new(0);

    let bot = QueryOptions::new()
        .cache_key("bot_")
        .cache_lifetime(Duration::from_secs(300))
        .cache_key_priorities(["bot_", "user_"]);
    let user = QueryOptions::new()
        .cache_key("user_")
        .cache_lifetime(Duration::from_secs(60))
        .cache_key_priorities(["bot_", "user_"]);

    let lamps = SearchRequest::new("select", "/solr/products/select?q=lamp&rows=10");
    let chairs = SearchRequest::new("select", "/solr/products/select?q=chair&rows=10");

    let runs = [
        ("user lamps", &user, &lamps),
        ("user lamps again", &user, &lamps),
        ("bot lamps (falls back to user namespace)", &bot, &lamps),
        ("bot chairs", &bot, &chairs),
    ];

    for (label, options, request) in runs {
        let before = backend_calls.load(Ordering::SeqCst);

        let response: Value = engine
            .scope(options)?
            .execute(request, || async {
                backend_calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(json!({
                    "numFound": 1,
                    "docs": [{"uri": request.uri}],
                }))
            })
            .await?;

        let cached = backend_calls.load(Ordering::SeqCst) == before;
        info!(
            "{:<45} cached={:<5} numFound={}",
            label, cached, response["numFound"]
        );
    }

    info!("\n--- Statistics ---");
    info!("{}", engine.stats().await);

    Ok(())
}
