//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key is present but its TTL has elapsed since the last access
    #[error("Key expired: {0}")]
    Expired(String),

    /// Persistence medium could not be read or written
    #[error("Backend I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Backend serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TTL string could not be parsed as a duration
    #[error("Malformed TTL: {0}")]
    MalformedTtl(String),
}

impl CacheError {
    // == Is Miss ==
    /// Returns true for the errors callers should treat as a plain cache miss.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
