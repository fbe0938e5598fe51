//! Scan Cache Module
//!
//! Main cache engine: LRU-ordered storage with lazy TTL expiry, batch
//! operations, preloading, and lookup statistics.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::cache::entry::{current_timestamp_ms, resolve_ttl};
use crate::cache::{CacheEntry, CacheStats, LruList, StatsRecorder};
use crate::config::{CacheConfig, ConfigUpdate};
use crate::error::{CacheError, Result};
use crate::models::{CacheRecord, FrequentEntry, PreloadItem, RecentEntry};

/// Default number of entries returned by the diagnostic views.
pub const DEFAULT_VIEW_COUNT: usize = 10;

/// Where a key stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Missing,
    /// Physically stored but past its TTL
    Expired,
    Live,
}

// == Scan Cache ==
/// Bounded LRU cache for scan results with per-entry TTL.
///
/// A single-owner structure: every mutating operation takes `&mut self`.
/// Wrap it in [`SharedScanCache`](crate::SharedScanCache) to share it
/// between tasks.
#[derive(Debug, Clone)]
pub struct ScanCache<V> {
    /// Entries in recency order (front = least recently used)
    entries: LruList<CacheEntry<V>>,
    /// Hit/miss/eviction counters and latency window
    stats: StatsRecorder,
    config: CacheConfig,
}

impl<V> Default for ScanCache<V> {
    fn default() -> Self {
        Self::from_valid_config(CacheConfig::default())
    }
}

impl<V> ScanCache<V> {
    // == Constructors ==
    /// Creates a cache, rejecting a config with `max_size == 0`.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Creates a cache holding at most `max_size` entries, defaults otherwise.
    pub fn with_max_size(max_size: usize) -> Result<Self> {
        Self::new(CacheConfig::with_max_size(max_size))
    }

    fn from_valid_config(config: CacheConfig) -> Self {
        Self {
            entries: LruList::with_capacity(config.max_size),
            stats: StatsRecorder::new(),
            config,
        }
    }

    // == Set ==
    /// Stores a value under `key`, optionally with its own TTL in milliseconds.
    ///
    /// The TTL is fixed at write time: `None` or `Some(0)` takes the current
    /// `default_ttl_ms`, and later config changes do not touch stored entries.
    /// When the cache is full and `key` is new, the least recently used entry
    /// is evicted first. Overwriting an existing key replaces the value,
    /// resets its timestamps and access count, and keeps its recency position.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_ms: Option<u64>) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;
        let ttl_ms = resolve_ttl(ttl_ms, self.config.default_ttl_ms);
        self.admit(key, CacheEntry::new(value, ttl_ms));
        Ok(())
    }

    /// Inserts an entry, making room first if `key` is new and the cache is full.
    fn admit(&mut self, key: String, entry: CacheEntry<V>) {
        if !self.entries.contains(&key) && self.entries.len() >= self.config.max_size {
            self.evict_oldest();
        }
        self.entries.insert(key, entry);
    }

    // == Has ==
    /// Checks whether `key` holds a live entry.
    ///
    /// Does not touch access metadata, recency order, or hit/miss counters.
    /// An expired entry found here is removed.
    pub fn has(&mut self, key: &str) -> bool {
        match self.presence(key, current_timestamp_ms()) {
            Presence::Live => true,
            Presence::Expired => {
                self.remove_expired(key);
                false
            }
            Presence::Missing => false,
        }
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Evict Oldest ==
    /// Removes the least recently used entry and counts it as an eviction.
    ///
    /// Returns the evicted key, or None if the cache was empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (key, _) = self.entries.pop_oldest()?;
        self.stats.record_eviction();
        debug!(key = %key, "Evicted least recently used entry");
        Some(key)
    }

    // == Evict Expired ==
    /// Removes every entry whose TTL has elapsed.
    ///
    /// Returns the number of entries removed; each counts as an eviction.
    pub fn evict_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let removed = self
            .entries
            .remove_where(|_, entry| entry.is_expired_at(now));

        for _ in &removed {
            self.stats.record_eviction();
        }
        if !removed.is_empty() {
            debug!(count = removed.len(), "Evicted expired entries");
        }
        removed.len()
    }

    // == Preload ==
    /// Warms the cache with the entries `fetch` considers frequent for `scope_id`.
    ///
    /// `fetch` is called with the scope and `preload_batch_size`. Every
    /// returned item is stored via [`set`](Self::set). Preloading is best
    /// effort: a fetch error is logged and yields 0 with nothing inserted.
    pub async fn preload_frequent<F, Fut, E>(&mut self, scope_id: &str, fetch: F) -> usize
    where
        F: FnOnce(String, usize) -> Fut,
        Fut: Future<Output = std::result::Result<Vec<PreloadItem<V>>, E>>,
        E: Display,
    {
        match self.try_preload_frequent(scope_id, fetch).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(scope_id, error = %err, "Failed to preload cache");
                0
            }
        }
    }

    /// Like [`preload_frequent`](Self::preload_frequent) but reports a fetch
    /// failure as [`CacheError::PreloadFailed`].
    pub async fn try_preload_frequent<F, Fut, E>(&mut self, scope_id: &str, fetch: F) -> Result<usize>
    where
        F: FnOnce(String, usize) -> Fut,
        Fut: Future<Output = std::result::Result<Vec<PreloadItem<V>>, E>>,
        E: Display,
    {
        let limit = self.config.preload_batch_size;
        let items = fetch(scope_id.to_string(), limit)
            .await
            .map_err(|err| CacheError::PreloadFailed(err.to_string()))?;

        let loaded = self.load_preloaded(items);
        info!(scope_id, loaded, "Preloaded frequent entries");
        Ok(loaded)
    }

    /// Stores an already-fetched preload batch, returning how many were stored.
    pub fn load_preloaded(&mut self, items: Vec<PreloadItem<V>>) -> usize {
        let mut loaded = 0;
        for item in items {
            match self.set(item.key, item.value, None) {
                Ok(()) => loaded += 1,
                Err(err) => warn!(error = %err, "Skipped preload item"),
            }
        }
        loaded
    }

    // == Set Many ==
    /// Stores each `(key, value, ttl_ms)` in order. Returns how many were stored.
    pub fn set_many<K, I>(&mut self, items: I) -> usize
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V, Option<u64>)>,
    {
        let mut stored = 0;
        for (key, value, ttl_ms) in items {
            if self.set(key, value, ttl_ms).is_ok() {
                stored += 1;
            }
        }
        stored
    }

    // == Stats ==
    /// Returns a statistics snapshot derived from the running counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len(), self.config.max_size)
    }

    /// Zeroes hit/miss/eviction counters and the latency window.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Config ==
    /// Returns a copy of the current configuration.
    pub fn config(&self) -> CacheConfig {
        self.config.clone()
    }

    /// Merges `update` into the configuration.
    ///
    /// Shrinking `max_size` below the current size evicts least recently used
    /// entries until the bound holds. An invalid result leaves the cache unchanged.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<()> {
        let merged = self.config.merged(&update);
        merged.validate()?;
        self.config = merged;

        while self.entries.len() > self.config.max_size && self.evict_oldest().is_some() {}
        Ok(())
    }

    // == Import ==
    /// Loads exported records, oldest first.
    ///
    /// Capacity is enforced exactly as repeated `set` calls would, and every
    /// record takes the current `default_ttl_ms`. Records with an empty key
    /// are skipped. Returns the number of records stored.
    pub fn import(&mut self, records: Vec<CacheRecord<V>>) -> usize {
        let now = current_timestamp_ms();
        let mut imported = 0;
        let mut skipped = 0;

        for record in records {
            if !record.is_valid() {
                skipped += 1;
                continue;
            }
            let entry = CacheEntry {
                value: record.value,
                created_at: record.created_at.unwrap_or(now),
                last_accessed_at: now,
                access_count: record.access_count.unwrap_or(0),
                ttl_ms: self.config.default_ttl_ms,
            };
            self.admit(record.key, entry);
            imported += 1;
        }

        if skipped > 0 {
            warn!(skipped, "Skipped import records with empty keys");
        }
        info!(imported, "Imported cache records");
        imported
    }

    // == Inspection ==
    /// Number of physically stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.config.max_size
    }

    /// Live keys, least recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.live_entries(current_timestamp_ms())
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Peeks at a live entry's metadata without any side effects.
    pub fn get_entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired_at(current_timestamp_ms()) {
            None
        } else {
            Some(entry)
        }
    }

    // == Clear ==
    /// Removes all entries. Statistics are left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Internal ==

    fn presence(&self, key: &str, now: u64) -> Presence {
        match self.entries.get(key) {
            None => Presence::Missing,
            Some(entry) if entry.is_expired_at(now) => Presence::Expired,
            Some(_) => Presence::Live,
        }
    }

    fn remove_expired(&mut self, key: &str) {
        self.entries.remove(key);
        debug!(key, "Removed expired entry on lookup");
    }

    fn live_entries<'a>(&'a self, now: u64) -> impl Iterator<Item = (&'a str, &'a CacheEntry<V>)> + 'a {
        self.entries
            .iter()
            .filter(move |(_, entry)| !entry.is_expired_at(now))
    }

    fn record_hit(&mut self, started: Instant) {
        if self.config.stats_enabled {
            self.stats.record_hit(started.elapsed());
        }
    }

    fn record_miss(&mut self, started: Instant) {
        if self.config.stats_enabled {
            self.stats.record_miss(started.elapsed());
        }
    }
}

impl<V: Clone> ScanCache<V> {
    // == Get ==
    /// Retrieves a value, returning None on a miss.
    ///
    /// A live hit increments the entry's access count, stamps its last access
    /// time and moves it to the most recently used position. An expired entry
    /// is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let started = Instant::now();
        let now = current_timestamp_ms();

        match self.presence(key, now) {
            Presence::Missing => {
                self.record_miss(started);
                None
            }
            Presence::Expired => {
                self.remove_expired(key);
                self.record_miss(started);
                None
            }
            Presence::Live => {
                self.entries.touch(key);
                let value = self.entries.get_mut(key).map(|entry| {
                    entry.record_access(now);
                    entry.value.clone()
                });
                self.record_hit(started);
                value
            }
        }
    }

    // == Get Many ==
    /// Looks up each key via [`get`](Self::get); the map holds only the hits.
    pub fn get_many<K: AsRef<str>>(&mut self, keys: &[K]) -> HashMap<String, V> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = self.get(key) {
                found.insert(key.to_string(), value);
            }
        }
        found
    }

    /// Live values, least recently used first.
    pub fn values(&self) -> Vec<V> {
        self.live_entries(current_timestamp_ms())
            .map(|(_, entry)| entry.value.clone())
            .collect()
    }

    /// Live `(key, value)` pairs, least recently used first.
    pub fn entries(&self) -> Vec<(String, V)> {
        self.live_entries(current_timestamp_ms())
            .map(|(key, entry)| (key.to_string(), entry.value.clone()))
            .collect()
    }

    // == Diagnostic Views ==
    /// Up to `count` live entries with the highest access counts.
    ///
    /// Ties keep least-recently-used-first order.
    pub fn most_frequent(&self, count: usize) -> Vec<FrequentEntry<V>> {
        let mut ranked: Vec<FrequentEntry<V>> = self
            .live_entries(current_timestamp_ms())
            .map(|(key, entry)| FrequentEntry {
                key: key.to_string(),
                value: entry.value.clone(),
                access_count: entry.access_count,
            })
            .collect();

        ranked.sort_by(|a, b| b.access_count.cmp(&a.access_count));
        ranked.truncate(count);
        ranked
    }

    /// Up to `count` live entries with the latest access times.
    pub fn recently_accessed(&self, count: usize) -> Vec<RecentEntry<V>> {
        let mut ranked: Vec<RecentEntry<V>> = self
            .live_entries(current_timestamp_ms())
            .map(|(key, entry)| RecentEntry {
                key: key.to_string(),
                value: entry.value.clone(),
                last_accessed_at: entry.last_accessed_at,
            })
            .collect();

        ranked.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
        ranked.truncate(count);
        ranked
    }

    // == Export ==
    /// Snapshot of live entries, least recently used first, for persistence.
    ///
    /// Feeding the result to [`import`](Self::import) replays the same order.
    pub fn export(&self) -> Vec<CacheRecord<V>> {
        self.live_entries(current_timestamp_ms())
            .map(|(key, entry)| CacheRecord {
                key: key.to_string(),
                value: entry.value.clone(),
                created_at: Some(entry.created_at),
                access_count: Some(entry.access_count),
            })
            .collect()
    }
}

impl<V: DeserializeOwned> ScanCache<V> {
    /// Imports records from a JSON array.
    ///
    /// Elements that do not deserialize into a record (missing key or value,
    /// wrong types) are skipped individually. Anything other than an array
    /// is rejected.
    pub fn import_json(&mut self, document: serde_json::Value) -> Result<usize> {
        let serde_json::Value::Array(items) = document else {
            return Err(CacheError::Import(
                "expected a JSON array of records".to_string(),
            ));
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<CacheRecord<V>>(item) {
                Ok(record) => records.push(record),
                Err(err) => warn!(error = %err, "Skipped malformed import record"),
            }
        }
        Ok(self.import(records))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}
