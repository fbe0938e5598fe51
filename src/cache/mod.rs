//! Cache Module
//!
//! In-process scan-result caching with LRU eviction, TTL expiry and lookup statistics.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruList;
pub use stats::{CacheStats, StatsRecorder, LOOKUP_WINDOW};
pub use store::{ScanCache, DEFAULT_VIEW_COUNT};
