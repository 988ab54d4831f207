//! Cache Store Module
//!
//! Key to entry mapping with sliding-window TTL expiry.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Unbounded key-value storage with TTL support.
///
/// The store does no locking of its own; it is owned by exactly one backend,
/// which in turn sits behind the cache's lock.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Wraps an existing entry map, e.g. one restored from a snapshot.
    pub fn from_entries(entries: HashMap<String, CacheEntry<V>>) -> Self {
        Self { entries }
    }

    /// Borrows the raw entry map for serialization.
    pub fn entries(&self) -> &HashMap<String, CacheEntry<V>> {
        &self.entries
    }

    // == Add ==
    /// Stores a value under `key`, touched at `now`.
    ///
    /// An existing entry is overwritten in place and its TTL window restarted.
    /// There is no capacity bound.
    pub fn add_at(&mut self, key: String, value: V, ttl: Duration, now: DateTime<Utc>) {
        match self.entries.get_mut(&key) {
            Some(entry) => entry.replace(value, ttl, now),
            None => {
                self.entries.insert(key, CacheEntry::new(value, ttl, now));
            }
        }
    }

    /// Stores a value under `key`, touched now.
    pub fn add(&mut self, key: String, value: V, ttl: Duration) {
        self.add_at(key, value, ttl, Utc::now());
    }

    // == Scan Expired ==
    /// Lists every key whose entry is expired as of `now` without removing
    /// anything.
    pub fn scan_expired_at(&self, now: DateTime<Utc>) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Lists every key whose entry is expired right now.
    pub fn scan_expired(&self) -> Vec<String> {
        self.scan_expired_at(Utc::now())
    }

    // == Delete All ==
    /// Removes the given keys unconditionally. Returns how many were present.
    pub fn delete_all<I, K>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .filter(|key| self.entries.remove(key.as_ref()).is_some())
            .count()
    }

    // == Cleanup Expired ==
    /// Removes all entries expired as of `now`. Returns the number removed.
    pub fn cleanup_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let expired_keys = self.scan_expired_at(now);
        self.delete_all(expired_keys)
    }

    /// Removes all entries expired right now.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key as of `now`.
    ///
    /// A hit restarts the entry's TTL window. Expired entries are reported
    /// but left in place for the next sweep.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Result<V> {
        let Some(entry) = self.entries.get_mut(key) else {
            return Err(CacheError::NotFound(key.to_string()));
        };

        if entry.is_expired_at(now) {
            return Err(CacheError::Expired(key.to_string()));
        }

        entry.touch(now);
        Ok(entry.value.clone())
    }

    /// Retrieves a value by key right now.
    pub fn get(&mut self, key: &str) -> Result<V> {
        self.get_at(key, Utc::now())
    }
}
