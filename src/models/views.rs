//! Diagnostic view DTOs
//!
//! Returned by `ScanCache::most_frequent` and `ScanCache::recently_accessed`.

use serde::Serialize;

/// An entry ranked by how often it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentEntry<V> {
    pub key: String,
    pub value: V,
    pub access_count: u64,
}

/// An entry ranked by when it was last read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry<V> {
    pub key: String,
    pub value: V,
    /// Unix milliseconds
    pub last_accessed_at: u64,
}
