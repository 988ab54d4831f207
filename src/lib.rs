//! TTL Cache - An embeddable in-process key-value cache
//!
//! Entries expire a fixed duration after their last access and are purged by a
//! background janitor. Contents can optionally be snapshotted to a JSON file.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod tasks;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use cache::{parse_duration, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use facade::{Cache, FileCache, MemoryCache};
