//! Backend Module
//!
//! Storage backends the cache facade delegates to. A backend *is* the store
//! for its variant: it owns the entries and, optionally, a durable medium.
//!
//! # Variants
//! - [`MemoryBackend`]: in-memory only, `flush` is a no-op
//! - [`FileBackend`]: warm-starts from and flushes to a JSON snapshot file

mod file;
mod memory;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::Result;

pub use file::FileBackend;
pub use memory::MemoryBackend;

// == Backend Trait ==
/// Capability set every storage backend provides.
///
/// Implementations do no locking; the cache serializes all calls through a
/// single mutex.
pub trait Backend: Send + 'static {
    /// Type of the stored values.
    type Value: Clone + Send + 'static;

    /// Looks up `key`, restarting its TTL window on a hit.
    ///
    /// # Errors
    /// [`CacheError::NotFound`](crate::error::CacheError::NotFound) when absent,
    /// [`CacheError::Expired`](crate::error::CacheError::Expired) when past its TTL.
    fn get(&mut self, key: &str) -> Result<Self::Value>;

    /// Inserts or overwrites `key`.
    fn add(&mut self, key: String, value: Self::Value, ttl: Duration) -> Result<()>;

    /// Persists the full current state to the backend's medium.
    fn flush(&self) -> Result<()>;

    /// Purges expired entries. Returns the number removed.
    fn clean(&mut self) -> usize;

    /// Number of stored entries, expired ones included.
    fn len(&self) -> usize;

    /// Returns true if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locks a shared backend, recovering the guard if a previous holder panicked.
pub(crate) fn lock<B>(backend: &Mutex<B>) -> MutexGuard<'_, B> {
    backend.lock().unwrap_or_else(PoisonError::into_inner)
}
