//! Record DTOs
//!
//! Serializable shapes used to move entries in and out of a cache.

use serde::{Deserialize, Serialize};

/// One entry as exported for, or imported from, a persistence collaborator.
///
/// `created_at` and `access_count` are always present on export. On import
/// they are optional: a missing `created_at` means "now" and a missing
/// `access_count` means 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord<V> {
    /// The lookup key (e.g. a barcode)
    pub key: String,
    /// The cached payload
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    /// Successful reads so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_count: Option<u64>,
}

impl<V> CacheRecord<V> {
    /// Creates a record with no metadata.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
            created_at: None,
            access_count: None,
        }
    }

    /// Records with an empty key cannot be stored.
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty()
    }
}

/// One item returned by a preload fetch function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadItem<V> {
    pub key: String,
    pub value: V,
}

impl<V> PreloadItem<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
