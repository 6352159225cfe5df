//! Cache decision engine
//!
//! The engine is called at three points of a query's life:
//!
//! 1. [`CacheDecisionEngine::on_query_finalized`] turns query options into a
//!    [`CacheProfile`] (or `None` when the query does not cache).
//! 2. [`CacheDecisionEngine::on_before_execute`] derives the cache key and
//!    looks for a stored response, first under the profile's own key and then
//!    under the alternate namespaces of the key priority list.
//! 3. [`CacheDecisionEngine::on_after_execute`] stores a freshly computed
//!    response.
//!
//! The profile is owned by the caller and passed to each phase, so a single
//! engine can serve any number of concurrent queries.

use crate::cache::{
    codec::{self, Decoded},
    config::EngineConfig,
    fingerprint::{fingerprint, is_select_handler},
    profile::CacheProfile,
    query_log,
    request::{QueryOptions, SearchRequest},
    store::CacheStore,
    types::{CacheKey, CacheStats, Decision, LookupSource},
};
use crate::error::{CacheError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Decides whether select requests are served from or written to the cache
pub struct CacheDecisionEngine {
    config: EngineConfig,
    store: Option<Arc<dyn CacheStore>>,
    stats: RwLock<CacheStats>,
}

impl CacheDecisionEngine {
    /// Create an engine without a store; bind one with [`Self::set_store`]
    pub fn new(config: EngineConfig) -> Self {
        info!("Initializing cache decision engine with config: {:?}", config);

        Self {
            config,
            store: None,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Create an engine bound to `store`
    pub fn with_store(config: EngineConfig, store: Arc<dyn CacheStore>) -> Self {
        let mut engine = Self::new(config);
        engine.set_store(store);
        engine
    }

    /// Bind the key/value store
    pub fn set_store(&mut self, store: Arc<dyn CacheStore>) {
        info!("Binding cache store: {}", store.name());
        self.store = Some(store);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `handler` is eligible for caching
    pub fn is_select_handler(&self, handler: &str) -> bool {
        is_select_handler(handler, &self.config.select_handler_prefix)
    }

    /// Phase A: resolve the profile for a finalized query
    ///
    /// Returns `Ok(None)` when the query has no cache lifetime.
    ///
    /// # Errors
    /// `InvalidConfiguration` when the options are inconsistent.
    pub fn on_query_finalized(&self, options: &QueryOptions) -> Result<Option<CacheProfile>> {
        let profile =
            CacheProfile::from_options(options, self.config.default_log_file_path.as_deref())?;

        if profile.is_none() {
            debug!("Query has no cache lifetime, caching disabled");
        }

        Ok(profile)
    }

    /// Phase B: look for a cached response before `request` is dispatched
    ///
    /// On a hit the profile is cleared so that phase C does not store the
    /// response again. Store failures and corrupt payloads count as misses.
    ///
    /// # Errors
    /// `NotConfigured` when a lookup is needed but no store is bound.
    pub async fn on_before_execute<R: DeserializeOwned>(
        &self,
        profile: &mut Option<CacheProfile>,
        request: &SearchRequest,
    ) -> Result<Decision<R>> {
        let Some(active) = profile.as_mut() else {
            return Ok(Decision::Miss);
        };

        if !self.is_select_handler(&request.handler) {
            debug!("Handler '{}' is not cacheable", request.handler);
            self.record(|stats| stats.bypassed += 1).await;
            return Ok(Decision::Miss);
        }

        if active.log_queries() {
            if let Some(path) = active.log_file_path() {
                if let Err(e) = query_log::append(path, request).await {
                    warn!("Failed to log query to {}: {}", path, e);
                    self.record(|stats| stats.log_failures += 1).await;
                }
            }
        }

        let fingerprint = fingerprint(request);
        let key: CacheKey = format!("{}{}", active.prefix(), fingerprint);
        active.set_key(key.clone());

        let store = self.store()?;

        let candidate = match Self::fetch_quietly(store, &key).await {
            Some(bytes) => Some((bytes, LookupSource::Primary)),
            None => Self::fetch_by_priority(store, active, &fingerprint).await,
        };

        let Some((bytes, source)) = candidate else {
            debug!("Cache miss: {}", key);
            self.record(|stats| stats.misses += 1).await;
            return Ok(Decision::Miss);
        };

        match codec::decode::<R>(&bytes) {
            Decoded::Value(response) => {
                debug!("Cache hit ({}): {}", source, key);
                self.record(|stats| match source {
                    LookupSource::Primary => stats.hits += 1,
                    LookupSource::Priority { .. } => stats.fallback_hits += 1,
                })
                .await;

                *profile = None;
                Ok(Decision::Hit { response, source })
            }
            Decoded::Corrupt => {
                warn!("Discarding corrupt cache entry ({}): {}", source, key);
                self.record(|stats| {
                    stats.corrupt += 1;
                    stats.misses += 1;
                })
                .await;
                Ok(Decision::Miss)
            }
        }
    }

    /// Phase C: store the response of an executed request
    ///
    /// Consumes the profile when the response is eligible for saving. A
    /// non-select handler leaves the profile in place. Encoding and store
    /// failures are logged and swallowed since the query itself already
    /// succeeded.
    ///
    /// # Errors
    /// `NotConfigured` when a save is needed but no store is bound.
    pub async fn on_after_execute<R: Serialize>(
        &self,
        profile: &mut Option<CacheProfile>,
        request: &SearchRequest,
        response: &R,
    ) -> Result<()> {
        if profile.is_none() || !self.is_select_handler(&request.handler) {
            return Ok(());
        }

        let store = self.store()?;

        let Some(active) = profile.take() else {
            return Ok(());
        };

        let key = match active.key() {
            Some(key) if active.is_key_derived() => key.to_string(),
            _ => format!("{}{}", active.prefix(), fingerprint(request)),
        };

        let bytes = match codec::encode(response) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize response for {}: {}", key, e);
                self.record(|stats| stats.save_failures += 1).await;
                return Ok(());
            }
        };

        match store.save(&key, &bytes, active.lifetime()).await {
            Ok(()) => {
                debug!("Cached response under {} for {:?}", key, active.lifetime());
                self.record(|stats| stats.saves += 1).await;
            }
            Err(e) => {
                warn!("Failed to store response under {}: {}", key, e);
                self.record(|stats| stats.save_failures += 1).await;
            }
        }

        Ok(())
    }

    /// Get engine statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    fn store(&self) -> Result<&Arc<dyn CacheStore>> {
        self.store.as_ref().ok_or(CacheError::NotConfigured)
    }

    /// Internal: fetch treating store errors as misses
    async fn fetch_quietly(store: &Arc<dyn CacheStore>, key: &str) -> Option<Vec<u8>> {
        match store.fetch(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache fetch failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Internal: probe the namespaces listed after the profile's own entry
    ///
    /// Priorities run from highest to lowest. Entries up to and including the
    /// first one that prefixes the profile key are skipped; every following
    /// entry is probed as `entry + fingerprint`, first hit wins.
    async fn fetch_by_priority(
        store: &Arc<dyn CacheStore>,
        profile: &CacheProfile,
        fingerprint: &str,
    ) -> Option<(Vec<u8>, LookupSource)> {
        let home = profile.prefix();
        let mut found = false;

        for prefix in profile.key_priorities() {
            if !found {
                found = home.starts_with(prefix.as_str());
                continue;
            }

            let key = format!("{}{}", prefix, fingerprint);
            if let Some(bytes) = Self::fetch_quietly(store, &key).await {
                return Some((
                    bytes,
                    LookupSource::Priority {
                        prefix: prefix.clone(),
                    },
                ));
            }
        }

        None
    }

    /// Internal: update counters when metrics are enabled
    async fn record<F: FnOnce(&mut CacheStats)>(&self, update: F) {
        if self.config.enable_metrics {
            let mut stats = self.stats.write().await;
            update(&mut *stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use std::time::Duration;

    fn engine(store: &Arc<MemoryStore>) -> CacheDecisionEngine {
        CacheDecisionEngine::with_store(EngineConfig::default(), store.clone())
    }

    fn select_request() -> SearchRequest {
        SearchRequest::new("select", "/solr/select?q=*")
    }

    fn fp(request: &SearchRequest) -> String {
        fingerprint(request)
    }

    #[test]
    fn test_query_without_lifetime_has_no_profile() {
        let engine = CacheDecisionEngine::new(EngineConfig::default());
        let profile = engine
            .on_query_finalized(&QueryOptions::new().cache_key("user_"))
            .unwrap();
        assert!(profile.is_none());
    }

    #[test]
    fn test_invalid_options_fail_phase_a() {
        let engine = CacheDecisionEngine::new(EngineConfig::default());
        let options = QueryOptions::new()
            .cache_lifetime(Duration::from_secs(60))
            .log_queries(true);

        let err = engine.on_query_finalized(&options).unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let options = QueryOptions::new().cache_lifetime(Duration::from_secs(60));
        let request = select_request();

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let decision: Decision<String> =
            engine.on_before_execute(&mut profile, &request).await.unwrap();
        assert_eq!(decision, Decision::Miss);
        assert_eq!(profile.as_ref().and_then(|p| p.key()), Some(fp(&request).as_str()));

        engine
            .on_after_execute(&mut profile, &request, &"fresh".to_string())
            .await
            .unwrap();
        assert!(profile.is_none());
        assert!(store.contains_key(&fp(&request)).await);

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let decision: Decision<String> =
            engine.on_before_execute(&mut profile, &request).await.unwrap();
        assert_eq!(
            decision,
            Decision::Hit {
                response: "fresh".to_string(),
                source: LookupSource::Primary
            }
        );
        assert!(profile.is_none());

        let stats = engine.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.saves, 1);
    }

    #[tokio::test]
    async fn test_prefix_is_prepended_to_fingerprint() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let options = QueryOptions::new()
            .cache_key("user_42_")
            .cache_lifetime(Duration::from_secs(60));
        let request = select_request();

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let _: Decision<String> = engine.on_before_execute(&mut profile, &request).await.unwrap();

        let expected = format!("user_42_{}", fp(&request));
        assert_eq!(profile.as_ref().and_then(|p| p.key()), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_missing_store_is_reported() {
        let engine = CacheDecisionEngine::new(EngineConfig::default());
        let options = QueryOptions::new().cache_lifetime(Duration::from_secs(60));

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let err = engine
            .on_before_execute::<String>(&mut profile, &select_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::NotConfigured));
    }

    #[tokio::test]
    async fn test_missing_store_not_needed_without_profile() {
        let engine = CacheDecisionEngine::new(EngineConfig::default());
        let mut profile = None;

        let decision = engine
            .on_before_execute::<String>(&mut profile, &select_request())
            .await
            .unwrap();
        assert_eq!(decision, Decision::Miss);

        engine
            .on_after_execute(&mut profile, &select_request(), &"x")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_select_handler_bypasses() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let options = QueryOptions::new().cache_lifetime(Duration::from_secs(60));
        let request = SearchRequest::new("update", "/solr/update");

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let decision: Decision<String> =
            engine.on_before_execute(&mut profile, &request).await.unwrap();
        assert_eq!(decision, Decision::Miss);
        assert!(!profile.as_ref().unwrap().is_key_derived());

        engine
            .on_after_execute(&mut profile, &request, &"ok".to_string())
            .await
            .unwrap();
        assert!(store.is_empty().await);
        assert!(profile.is_some());
        assert_eq!(engine.stats().await.bypassed, 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let request = select_request();
        store
            .save(&fp(&request), b"{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let options = QueryOptions::new().cache_lifetime(Duration::from_secs(60));
        let mut profile = engine.on_query_finalized(&options).unwrap();
        let decision: Decision<String> =
            engine.on_before_execute(&mut profile, &request).await.unwrap();

        assert_eq!(decision, Decision::Miss);
        assert!(profile.is_some());
        assert_eq!(engine.stats().await.corrupt, 1);
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let store = Arc::new(MemoryStore::new());
        let config = EngineConfig::builder()
            .enable_metrics(false)
            .build()
            .unwrap();
        let engine = CacheDecisionEngine::with_store(config, store.clone());
        let options = QueryOptions::new().cache_lifetime(Duration::from_secs(60));

        let mut profile = engine.on_query_finalized(&options).unwrap();
        let _: Decision<String> = engine
            .on_before_execute(&mut profile, &select_request())
            .await
            .unwrap();

        assert_eq!(engine.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_phase_c_derives_key_when_phase_b_skipped() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let options = QueryOptions::new()
            .cache_key("bot_")
            .cache_lifetime(Duration::from_secs(60));
        let request = select_request();

        let mut profile = engine.on_query_finalized(&options).unwrap();
        engine
            .on_after_execute(&mut profile, &request, &"direct".to_string())
            .await
            .unwrap();

        assert!(store.contains_key(&format!("bot_{}", fp(&request))).await);
    }

    #[tokio::test]
    async fn test_repeated_phase_b_does_not_stack_fingerprints() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);
        let options = QueryOptions::new()
            .cache_key("user_")
            .cache_lifetime(Duration::from_secs(60));
        let request = select_request();
        let expected = format!("user_{}", fp(&request));

        let mut profile = engine.on_query_finalized(&options).unwrap();
        for _ in 0..2 {
            let decision: Decision<String> =
                engine.on_before_execute(&mut profile, &request).await.unwrap();
            assert_eq!(decision, Decision::Miss);
            assert_eq!(profile.as_ref().and_then(|p| p.key()), Some(expected.as_str()));
        }

        engine
            .on_after_execute(&mut profile, &request, &"fresh".to_string())
            .await
            .unwrap();

        assert!(store.contains_key(&expected).await);
        assert_eq!(store.len().await, 1);
        assert_eq!(engine.stats().await.misses, 2);
    }
}
