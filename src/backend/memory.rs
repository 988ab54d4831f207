//! In-memory backend with no persistence.

use std::time::Duration;

use crate::backend::Backend;
use crate::cache::CacheStore;
use crate::error::Result;

/// Backend holding entries only in memory.
#[derive(Debug)]
pub struct MemoryBackend<V> {
    store: CacheStore<V>,
}

impl<V> Default for MemoryBackend<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryBackend<V> {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self {
            store: CacheStore::new(),
        }
    }

    /// Creates a backend pre-populated with `store`.
    pub fn with_store(store: CacheStore<V>) -> Self {
        Self { store }
    }
}

impl<V: Clone + Send + 'static> Backend for MemoryBackend<V> {
    type Value = V;

    fn get(&mut self, key: &str) -> Result<V> {
        self.store.get(key)
    }

    fn add(&mut self, key: String, value: V, ttl: Duration) -> Result<()> {
        self.store.add(key, value, ttl);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn clean(&mut self) -> usize {
        self.store.cleanup_expired()
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}
