//! Shared Cache Handle
//!
//! Thread-safe wrapper for hosts that call the cache from several tasks.
//! One lock guards entries and statistics together, since every `get`
//! updates both.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::cache::{CacheStats, ScanCache};
use crate::config::{CacheConfig, ConfigUpdate};
use crate::error::Result;
use crate::models::{CacheRecord, PreloadItem};

/// Cloneable handle to one [`ScanCache`] behind an async `RwLock`.
///
/// Lookups take the write lock because a hit reorders entries and updates
/// counters.
#[derive(Debug)]
pub struct SharedScanCache<V> {
    inner: Arc<RwLock<ScanCache<V>>>,
}

impl<V> Clone for SharedScanCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> SharedScanCache<V> {
    /// Wraps an existing cache.
    pub fn new(cache: ScanCache<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a shared cache from configuration.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(ScanCache::new(config)?))
    }

    /// Read access for operations not mirrored here.
    pub async fn read(&self) -> RwLockReadGuard<'_, ScanCache<V>> {
        self.inner.read().await
    }

    /// Write access for operations not mirrored here.
    pub async fn write(&self) -> RwLockWriteGuard<'_, ScanCache<V>> {
        self.inner.write().await
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl_ms: Option<u64>) -> Result<()> {
        self.inner.write().await.set(key, value, ttl_ms)
    }

    pub async fn set_many<K, I>(&self, items: I) -> usize
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V, Option<u64>)>,
    {
        self.inner.write().await.set_many(items)
    }

    pub async fn has(&self, key: &str) -> bool {
        self.inner.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    pub async fn evict_oldest(&self) -> Option<String> {
        self.inner.write().await.evict_oldest()
    }

    pub async fn evict_expired(&self) -> usize {
        self.inner.write().await.evict_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn reset_stats(&self) {
        self.inner.write().await.reset_stats();
    }

    pub async fn update_config(&self, update: ConfigUpdate) -> Result<()> {
        self.inner.write().await.update_config(update)
    }

    pub async fn import(&self, records: Vec<CacheRecord<V>>) -> usize {
        self.inner.write().await.import(records)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Warms the cache without holding the lock while `fetch` runs.
    ///
    /// The batch is inserted only after the fetch resolves, so dropping this
    /// future early leaves the cache untouched. A fetch error yields 0.
    pub async fn preload_frequent<F, Fut, E>(&self, scope_id: &str, fetch: F) -> usize
    where
        F: FnOnce(String, usize) -> Fut,
        Fut: Future<Output = std::result::Result<Vec<PreloadItem<V>>, E>>,
        E: Display,
    {
        let limit = self.inner.read().await.config().preload_batch_size;

        match fetch(scope_id.to_string(), limit).await {
            Ok(items) => {
                let loaded = self.inner.write().await.load_preloaded(items);
                info!(scope_id, loaded, "Preloaded frequent entries");
                loaded
            }
            Err(err) => {
                warn!(scope_id, error = %err, "Failed to preload cache");
                0
            }
        }
    }
}

impl<V: Clone> SharedScanCache<V> {
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.write().await.get(key)
    }

    pub async fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> HashMap<String, V> {
        self.inner.write().await.get_many(keys)
    }

    pub async fn export(&self) -> Vec<CacheRecord<V>> {
        self.inner.read().await.export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shared(max_size: usize) -> SharedScanCache<String> {
        SharedScanCache::from_config(CacheConfig::with_max_size(max_size)).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = shared(10);

        cache.set("B1", "bottleA".to_string(), None).await.unwrap();

        assert_eq!(cache.get("B1").await, Some("bottleA".to_string()));
        assert_eq!(cache.get("B2").await, None);
        let stats = cache.stats().await;
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = shared(10);
        let other = cache.clone();

        other.set("B1", "bottleA".to_string(), None).await.unwrap();

        assert!(cache.has("B1").await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_sets_respect_capacity() {
        let cache = shared(8);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.set(format!("B{}", i), i.to_string(), None).await.unwrap();
                    cache.get(&format!("B{}", i)).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 8);
        let stats = cache.stats().await;
        assert_eq!(stats.evictions, 24);
        assert_eq!(stats.total_lookups, 32);
    }

    #[tokio::test]
    async fn test_preload_does_not_hold_lock_during_fetch() {
        let cache = shared(10);
        let writer = cache.clone();

        let loaded = cache
            .preload_frequent("org-1", |_, _| async move {
                // The lock is free while the fetch is pending
                writer.set("during", "fetch".to_string(), None).await.unwrap();
                Ok::<_, String>(vec![PreloadItem::new("B1", "bottleA".to_string())])
            })
            .await;

        assert_eq!(loaded, 1);
        assert!(cache.has("during").await);
        assert!(cache.has("B1").await);
    }

    #[tokio::test]
    async fn test_preload_failure_returns_zero() {
        let cache = shared(10);

        let loaded = cache
            .preload_frequent("org-1", |_, _| async {
                Err::<Vec<PreloadItem<String>>, _>("backend down")
            })
            .await;

        assert_eq!(loaded, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancelled_preload_inserts_nothing() {
        let cache = shared(10);

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            cache.preload_frequent("org-1", |_, _| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, String>(vec![PreloadItem::new("B1", "bottleA".to_string())])
            }),
        )
        .await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_export_import() {
        let source = shared(10);
        source
            .set_many(vec![
                ("a", "1".to_string(), None),
                ("b", "2".to_string(), None),
            ])
            .await;

        let target = shared(10);
        assert_eq!(target.import(source.export().await).await, 2);

        let found = target.get_many(&["a", "b"]).await;
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_update_config_through_handle() {
        let cache = shared(3);
        for key in ["a", "b", "c"] {
            cache.set(key, "v".to_string(), None).await.unwrap();
        }

        cache
            .update_config(ConfigUpdate::default().max_size(1))
            .await
            .unwrap();

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.read().await.keys(), vec!["c"]);
    }
}
