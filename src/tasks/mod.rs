//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of a cache.
//!
//! # Tasks
//! - TTL Janitor: Removes expired cache entries at a configured interval

mod janitor;

pub use janitor::{sweep, Janitor, DEFAULT_JANITOR_INTERVAL, MIN_JANITOR_INTERVAL};
