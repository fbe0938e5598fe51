//! Data models exchanged with the cache's collaborators
//!
//! Records handed to and from persistence and preload collaborators, and the
//! read-only diagnostic views.

pub mod records;
pub mod views;

// Re-export commonly used types
pub use records::{CacheRecord, PreloadItem};
pub use views::{FrequentEntry, RecentEntry};
