//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{parse_duration, DEFAULT_TTL};
use crate::tasks::DEFAULT_JANITOR_INTERVAL;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL substituted when `add` receives a malformed TTL string
    pub default_ttl: Duration,
    /// Interval between background sweeps
    pub janitor_interval: Duration,
    /// Snapshot file for the file backend; `None` keeps the cache in memory
    pub persist_path: Option<PathBuf>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Fallback TTL as a duration string (default: 24h)
    /// - `CACHE_JANITOR_INTERVAL` - Sweep frequency as a duration string (default: 60s)
    /// - `CACHE_PATH` - Snapshot file path (default: unset, in-memory only)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: duration_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            janitor_interval: duration_var("CACHE_JANITOR_INTERVAL")
                .unwrap_or(defaults.janitor_interval),
            persist_path: env::var_os("CACHE_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Sets the fallback TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the sweep interval.
    pub fn with_janitor_interval(mut self, interval: Duration) -> Self {
        self.janitor_interval = interval;
        self
    }

    /// Sets the snapshot path.
    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }
}

fn duration_var(name: &str) -> Option<Duration> {
    env::var(name).ok().and_then(|v| parse_duration(&v).ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            janitor_interval: DEFAULT_JANITOR_INTERVAL,
            persist_path: None,
        }
    }
}
