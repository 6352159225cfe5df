//! Query-scoped handle over the decision engine
//!
//! A [`CachedQuery`] owns the profile of exactly one query, so concurrent
//! queries sharing an engine never see each other's cache keys.

use crate::cache::{
    engine::CacheDecisionEngine,
    profile::CacheProfile,
    request::{QueryOptions, SearchRequest},
    types::Decision,
};
use crate::error::{CacheError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

/// One query's pass through the three interception phases
pub struct CachedQuery<'a> {
    engine: &'a CacheDecisionEngine,
    id: Uuid,
    profile: Option<CacheProfile>,
}

impl CacheDecisionEngine {
    /// Start a query scope (phase A)
    pub fn scope(&self, options: &QueryOptions) -> Result<CachedQuery<'_>> {
        let profile = self.on_query_finalized(options)?;
        let id = Uuid::new_v4();
        debug!(query_id = %id, cacheable = profile.is_some(), "Opened query scope");

        Ok(CachedQuery {
            engine: self,
            id,
            profile,
        })
    }
}

impl<'a> CachedQuery<'a> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> Option<&CacheProfile> {
        self.profile.as_ref()
    }

    /// Serve `request` from the cache or run `executor` and cache its result
    ///
    /// `executor` is not called on a cache hit. Its error is returned as is
    /// and nothing is stored in that case.
    pub async fn execute<R, E, F, Fut>(
        mut self,
        request: &SearchRequest,
        executor: F,
    ) -> std::result::Result<R, E>
    where
        R: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
    {
        let decision = self
            .engine
            .on_before_execute::<R>(&mut self.profile, request)
            .await?;

        if let Decision::Hit { response, source } = decision {
            debug!(query_id = %self.id, %source, "Serving cached response");
            return Ok(response);
        }

        let response = executor().await?;

        self.engine
            .on_after_execute(&mut self.profile, request, &response)
            .await?;

        Ok(response)
    }
}
