//! Error types for the scan cache
//!
//! Provides unified error handling using thiserror. A lookup miss is not an
//! error: `get` returns `None`. These variants cover the few operations that
//! can reject their input.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the scan cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key was empty
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration rejected (e.g. a zero `max_size`)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The preload fetch function failed
    #[error("Preload failed: {0}")]
    PreloadFailed(String),

    /// Import document could not be read as a list of records
    #[error("Import failed: {0}")]
    Import(String),
}

// == Result Type Alias ==
/// Convenience Result type for the scan cache.
pub type Result<T> = std::result::Result<T, CacheError>;
