//! Configuration Module
//!
//! Per-instance cache configuration, loadable from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default maximum number of entries
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default number of entries requested by a preload
pub const DEFAULT_PRELOAD_BATCH_SIZE: usize = 50;

/// Scan cache configuration parameters.
///
/// Each cache instance owns its own copy; there is no shared global config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries (must be > 0)
    pub max_size: usize,
    /// Fallback lifetime in milliseconds for entries stored without a TTL
    pub default_ttl_ms: Option<u64>,
    /// Number of entries `preload_frequent` asks the fetch function for
    pub preload_batch_size: usize,
    /// Whether hits, misses and lookup latency are tracked
    pub stats_enabled: bool,
}

impl CacheConfig {
    /// Creates a config with the given capacity and defaults for everything else.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    ///
    /// # Environment Variables
    /// - `SCAN_CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `SCAN_CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: none)
    /// - `SCAN_CACHE_PRELOAD_BATCH_SIZE` - Preload batch size (default: 50)
    /// - `SCAN_CACHE_STATS_ENABLED` - `true`/`false` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env::var("SCAN_CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_size),
            default_ttl_ms: env::var("SCAN_CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.default_ttl_ms),
            preload_batch_size: env::var("SCAN_CACHE_PRELOAD_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.preload_batch_size),
            stats_enabled: env::var("SCAN_CACHE_STATS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stats_enabled),
        }
    }

    /// Checks the invariants a cache relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns a copy of this config with `update` merged over it.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        Self {
            max_size: update.max_size.unwrap_or(self.max_size),
            default_ttl_ms: update.default_ttl_ms.unwrap_or(self.default_ttl_ms),
            preload_batch_size: update
                .preload_batch_size
                .unwrap_or(self.preload_batch_size),
            stats_enabled: update.stats_enabled.unwrap_or(self.stats_enabled),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl_ms: None,
            preload_batch_size: DEFAULT_PRELOAD_BATCH_SIZE,
            stats_enabled: true,
        }
    }
}

// == Config Update ==
/// Partial configuration applied by `ScanCache::update_config`.
///
/// `None` leaves a field unchanged. `default_ttl_ms: Some(None)` clears the
/// default TTL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub max_size: Option<usize>,
    pub default_ttl_ms: Option<Option<u64>>,
    pub preload_batch_size: Option<usize>,
    pub stats_enabled: Option<bool>,
}

impl ConfigUpdate {
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn default_ttl_ms(mut self, ttl_ms: Option<u64>) -> Self {
        self.default_ttl_ms = Some(ttl_ms);
        self
    }

    pub fn preload_batch_size(mut self, size: usize) -> Self {
        self.preload_batch_size = Some(size);
        self
    }

    pub fn stats_enabled(mut self, enabled: bool) -> Self {
        self.stats_enabled = Some(enabled);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.default_ttl_ms, None);
        assert_eq!(config.preload_batch_size, 50);
        assert!(config.stats_enabled);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SCAN_CACHE_MAX_SIZE");
        env::remove_var("SCAN_CACHE_DEFAULT_TTL_MS");
        env::remove_var("SCAN_CACHE_PRELOAD_BATCH_SIZE");
        env::remove_var("SCAN_CACHE_STATS_ENABLED");

        let config = CacheConfig::from_env();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_max_size() {
        let config = CacheConfig::with_max_size(0);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
        assert!(CacheConfig::with_max_size(1).validate().is_ok());
    }

    #[test]
    fn test_merged_keeps_unset_fields() {
        let config = CacheConfig {
            default_ttl_ms: Some(5_000),
            ..CacheConfig::default()
        };
        let merged = config.merged(&ConfigUpdate::default().max_size(10));

        assert_eq!(merged.max_size, 10);
        assert_eq!(merged.default_ttl_ms, Some(5_000));
        assert_eq!(merged.preload_batch_size, 50);
    }

    #[test]
    fn test_merged_can_clear_default_ttl() {
        let config = CacheConfig {
            default_ttl_ms: Some(5_000),
            ..CacheConfig::default()
        };
        let merged = config.merged(&ConfigUpdate::default().default_ttl_ms(None));
        assert_eq!(merged.default_ttl_ms, None);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_size": 5}"#).unwrap();
        assert_eq!(config.max_size, 5);
        assert_eq!(config.preload_batch_size, 50);
        assert!(config.stats_enabled);
    }
}
