//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::Utc;

// == Cache Entry ==
/// A single cached scan result with access metadata.
///
/// The key lives in the owning list; the entry only carries the payload and
/// bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value, opaque to the cache
    pub value: V,
    /// Insert or last overwrite timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Most recent successful read (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Lifetime in milliseconds fixed at write time, None = never expires
    pub ttl_ms: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry stamped with the current time.
    pub fn new(value: V, ttl_ms: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            ttl_ms,
        }
    }

    // == Age ==
    /// Milliseconds since the entry was created, saturating at zero.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived its TTL at `now`.
    ///
    /// Expired means the age is strictly greater than the TTL, so an entry is
    /// still served on the exact millisecond its lifetime ends. Entries with
    /// no TTL never expire.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.ttl_ms {
            Some(ttl) => self.age_ms(now) > ttl,
            None => false,
        }
    }

    // == Record Access ==
    /// Marks a successful read.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }
}

// == Utility Functions ==
/// Picks the lifetime an entry is written with.
///
/// An explicit TTL of 0 counts as "not given" and falls back to the default.
pub fn resolve_ttl(ttl_ms: Option<u64>, default_ttl_ms: Option<u64>) -> Option<u64> {
    ttl_ms.filter(|&ttl| ttl > 0).or(default_ttl_ms)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    // Clamp pre-epoch clocks to zero rather than wrapping.
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
