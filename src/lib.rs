//! Scan Cache - in-process caching for barcode scan lookups
//!
//! A bounded, generic LRU cache with per-entry TTL, batch operations,
//! preloading of frequently scanned keys, and lookup statistics. Fetching
//! and persistence stay with the caller: the cache only asks a supplied
//! function for preload data and hands out export records.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod shared;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, ScanCache};
pub use config::{CacheConfig, ConfigUpdate};
pub use error::{CacheError, Result};
pub use models::{CacheRecord, FrequentEntry, PreloadItem, RecentEntry};
pub use shared::SharedScanCache;
pub use tasks::spawn_sweep_task;
