//! Cache Facade
//!
//! The public operation set. Every read and write goes through one mutex
//! around the backend; the janitor contends for the same lock. Hit and miss
//! counters live outside the lock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::backend::{self, Backend, FileBackend, MemoryBackend};
use crate::cache::{ttl, CacheStats, StatsCounters};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{self, Janitor};

/// Cache kept only in memory.
pub type MemoryCache<V> = Cache<MemoryBackend<V>>;

/// Cache persisted to a JSON snapshot file.
pub type FileCache<V> = Cache<FileBackend<V>>;

// == Cache ==
/// An expiring key-value cache over a pluggable [`Backend`].
///
/// Construction starts a background janitor that purges expired entries;
/// dropping the cache stops it. Share a cache between threads with `Arc`.
///
/// # Example
/// ```
/// use ttl_cache::{MemoryBackend, Cache};
///
/// let cache = Cache::new(MemoryBackend::new());
/// cache.add("a", "x".to_string(), "10m").unwrap();
/// assert_eq!(cache.get("a").unwrap(), "x");
/// ```
pub struct Cache<B: Backend> {
    backend: Arc<Mutex<B>>,
    janitor: Mutex<Janitor>,
    stats: StatsCounters,
    default_ttl: Duration,
}

impl<B: Backend> Cache<B> {
    // == Constructor ==
    /// Wraps `backend` with default configuration and starts the janitor.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &CacheConfig::default())
    }

    /// Wraps `backend` using the TTL fallback and sweep interval from `config`.
    ///
    /// `config.persist_path` is not consulted; the backend is already built.
    pub fn with_config(backend: B, config: &CacheConfig) -> Self {
        let backend = Arc::new(Mutex::new(backend));
        let janitor = Janitor::start(Arc::clone(&backend), config.janitor_interval);

        Self {
            backend,
            janitor: Mutex::new(janitor),
            stats: StatsCounters::new(),
            default_ttl: config.default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value, restarting its TTL window on a hit.
    ///
    /// # Errors
    /// Any error is a miss; see [`CacheError::is_miss`](crate::CacheError::is_miss).
    pub fn get(&self, key: &str) -> Result<B::Value> {
        let result = backend::lock(&self.backend).get(key);
        match &result {
            Ok(_) => self.stats.record_hit(),
            Err(_) => self.stats.record_miss(),
        }
        result
    }

    // == Add ==
    /// Stores a value with a TTL given as a duration string such as `"10ms"`.
    ///
    /// A malformed TTL does not fail the call; the configured default TTL is
    /// used instead.
    pub fn add(&self, key: impl Into<String>, value: B::Value, ttl: &str) -> Result<()> {
        let ttl = ttl::parse_or(ttl, self.default_ttl);
        self.add_with_ttl(key, value, ttl)
    }

    /// Stores a value with an already-parsed TTL.
    pub fn add_with_ttl(
        &self,
        key: impl Into<String>,
        value: B::Value,
        ttl: Duration,
    ) -> Result<()> {
        backend::lock(&self.backend).add(key.into(), value, ttl)
    }

    // == Flush ==
    /// Persists the current contents through the backend.
    ///
    /// # Errors
    /// I/O or serialization failures from the backend. Memory-only backends
    /// always succeed.
    pub fn flush(&self) -> Result<()> {
        backend::lock(&self.backend).flush()
    }

    // == Stats ==
    /// Returns hit and miss counts without taking the store lock.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Purge Expired ==
    /// Runs one sweep immediately. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        tasks::sweep(&self.backend)
    }

    // == Janitor Interval ==
    /// Replaces the janitor with one sweeping every `interval`.
    ///
    /// The old janitor is stopped before the new one starts.
    pub fn set_janitor_interval(&self, interval: Duration) {
        let mut janitor = self.janitor.lock().unwrap_or_else(PoisonError::into_inner);
        janitor.stop();
        *janitor = Janitor::start(Arc::clone(&self.backend), interval);
        debug!("Janitor interval changed to {:?}", janitor.interval());
    }

    /// Returns the current sweep interval.
    pub fn janitor_interval(&self) -> Duration {
        self.janitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .interval()
    }

    /// Returns the TTL used when `add` receives a malformed TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        backend::lock(&self.backend).len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Close ==
    /// Stops the janitor, then flushes the backend.
    pub fn close(self) -> Result<()> {
        self.janitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
        self.flush()
    }
}

impl<B: Backend> std::fmt::Debug for Cache<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("stats", &self.stats())
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
