//! Key/value store binding used by the interceptor
//!
//! The interceptor only needs `fetch` and `save`. Production deployments bind
//! their own store (Redis, memcached, ...) by implementing [`CacheStore`].
//! [`MemoryStore`] is a minimal in-process binding for tests and demos.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Key/value store holding serialized responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value stored under `key`, `None` on miss
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `lifetime`
    ///
    /// A zero lifetime means the entry never expires.
    async fn save(&self, key: &str, value: &[u8], lifetime: Duration) -> Result<()>;

    fn name(&self) -> &'static str;
}

struct StoredValue {
    data: Vec<u8>,
    /// `None` never expires
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| Utc::now() > expires_at)
            .unwrap_or(false)
    }
}

/// Expiry instant for `lifetime` from now
///
/// Zero, and lifetimes too large to represent as a timestamp, never expire.
fn expiry_after(lifetime: Duration) -> Option<DateTime<Utc>> {
    if lifetime.is_zero() {
        return None;
    }

    chrono::Duration::from_std(lifetime)
        .ok()
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
}

/// In-process store with per-key expiry
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;

        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return Ok(None),
        };

        if expired {
            debug!("Memory store entry expired: {}", key);
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|entry| entry.data.clone()))
    }

    async fn save(&self, key: &str, value: &[u8], lifetime: Duration) -> Result<()> {
        let expires_at = expiry_after(lifetime);

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoredValue {
                data: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_fetch() {
        let store = MemoryStore::new();

        store
            .save("key1", b"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.fetch("key1").await.unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));
        assert!(store.contains_key("key1").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.fetch("nonexistent").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_entry_expiration() {
        let store = MemoryStore::new();

        store
            .save("expiring", b"value", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(store.fetch("expiring").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(store.fetch("expiring").await.unwrap().is_none());
        assert!(!store.contains_key("expiring").await);
    }

    #[tokio::test]
    async fn test_zero_lifetime_never_expires() {
        let store = MemoryStore::new();

        store.save("forever", b"value", Duration::ZERO).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.fetch("forever").await.unwrap(), Some(b"value".to_vec()));
        assert!(store.contains_key("forever").await);
    }

    #[tokio::test]
    async fn test_huge_lifetimes_are_kept_without_expiry() {
        let store = MemoryStore::new();

        store.save("max", b"a", Duration::MAX).await.unwrap();
        store
            .save("far", b"b", Duration::from_secs(10_000_000_000_000))
            .await
            .unwrap();

        assert_eq!(store.fetch("max").await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.fetch("far").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn test_expiry_after() {
        assert!(expiry_after(Duration::ZERO).is_none());
        assert!(expiry_after(Duration::MAX).is_none());

        let day = expiry_after(Duration::from_secs(86_400)).unwrap();
        assert!(day > Utc::now() + chrono::Duration::hours(23));
        assert!(day <= Utc::now() + chrono::Duration::hours(24));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryStore::new();
        store.save("k", b"old", Duration::from_secs(60)).await.unwrap();
        store.save("k", b"new", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.fetch("k").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_shared_store_through_arc() {
        let store = Arc::new(MemoryStore::new());
        let handle: Arc<dyn CacheStore> = store.clone();

        handle.save("k", b"v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.fetch("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(handle.name(), "memory");
    }
}
