//! Cache Module
//!
//! Provides in-memory storage with sliding-window TTL expiration.

mod entry;
mod stats;
mod store;
pub mod ttl;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;
pub use ttl::{parse_duration, DEFAULT_TTL};
