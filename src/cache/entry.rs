//! Cache Entry Module
//!
//! Defines the stored unit: a value, its TTL and the time it was last touched.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with sliding-window expiry.
///
/// The serialized field names (`ttl`, `atime`, `v`) are the snapshot format
/// written by the file backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// Time-to-live, measured from `last_access`
    #[serde(rename = "ttl", with = "ttl_nanos")]
    pub ttl: Duration,
    /// Last creation, overwrite or successful read
    #[serde(rename = "atime")]
    pub last_access: DateTime<Utc>,
    /// The stored value
    #[serde(rename = "v")]
    pub value: V,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry touched at `now`.
    pub fn new(value: V, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            ttl,
            last_access: now,
            value,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired only once strictly more than
    /// `ttl` has elapsed since `last_access`. A TTL too large to represent
    /// never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match TimeDelta::from_std(self.ttl) {
            Ok(ttl) => now.signed_duration_since(self.last_access) > ttl,
            Err(_) => false,
        }
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Touch ==
    /// Restarts the TTL window.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access = now;
    }

    // == Replace ==
    /// Overwrites value and TTL in place and restarts the TTL window.
    pub fn replace(&mut self, value: V, ttl: Duration, now: DateTime<Utc>) {
        self.value = value;
        self.ttl = ttl;
        self.last_access = now;
    }
}

/// TTL as signed 64-bit nanoseconds, saturating on overflow.
mod ttl_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = i64::deserialize(deserializer)?;
        // Negative TTLs expire immediately.
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
