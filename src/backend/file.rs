//! File Backend
//!
//! Keeps entries in memory and persists them wholesale to a JSON snapshot:
//!
//! ```json
//! { "data": { "<key>": { "ttl": 10000000, "atime": "2024-05-01T12:00:00Z", "v": "..." } } }
//! ```
//!
//! Opening never fails: a missing, empty or corrupt snapshot yields an empty
//! store. Restored entries keep their persisted access time, so stale ones are
//! purged by the next sweep.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::cache::{CacheEntry, CacheStore};
use crate::error::Result;

// == Snapshot Models ==
#[derive(Deserialize)]
struct Snapshot<V> {
    data: HashMap<String, CacheEntry<V>>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, V> {
    data: &'a HashMap<String, CacheEntry<V>>,
}

// == File Backend ==
/// Backend that warm-starts from and flushes to a JSON file.
#[derive(Debug)]
pub struct FileBackend<V> {
    path: PathBuf,
    store: CacheStore<V>,
}

impl<V> FileBackend<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    // == Open ==
    /// Opens the snapshot at `path`, falling back to an empty store on any
    /// read or decode failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match load_snapshot(&path) {
            Ok(Some(entries)) => {
                info!("Restored {} entries from {}", entries.len(), path.display());
                CacheStore::from_entries(entries)
            }
            Ok(None) => CacheStore::new(),
            Err(e) => {
                warn!(
                    "Could not restore cache from {}, starting empty: {}",
                    path.display(),
                    e
                );
                CacheStore::new()
            }
        };

        Self { path, store }
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the snapshot to a uniquely named temp file beside the target and
    /// persists it over the target. The temp file is removed on any failure.
    fn write_snapshot(&self) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(
                &mut writer,
                &SnapshotRef {
                    data: self.store.entries(),
                },
            )?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(io::Error::from)?;
        Ok(())
    }
}

/// Reads and decodes a snapshot. `Ok(None)` means there was nothing to restore.
fn load_snapshot<V: DeserializeOwned>(
    path: &Path,
) -> Result<Option<HashMap<String, CacheEntry<V>>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No snapshot at {}, starting empty", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("Snapshot at {} is empty, starting empty", path.display());
        return Ok(None);
    }

    let snapshot: Snapshot<V> = serde_json::from_slice(&bytes)?;
    Ok(Some(snapshot.data))
}

impl<V> Backend for FileBackend<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    type Value = V;

    fn get(&mut self, key: &str) -> Result<V> {
        self.store.get(key)
    }

    fn add(&mut self, key: String, value: V, ttl: Duration) -> Result<()> {
        self.store.add(key, value, ttl);
        Ok(())
    }

    // == Flush ==
    /// Replaces the snapshot atomically, so the previous one survives a
    /// failed write and concurrent flushers never share a temp file.
    fn flush(&self) -> Result<()> {
        self.write_snapshot()?;
        debug!("Flushed {} entries to {}", self.store.len(), self.path.display());
        Ok(())
    }

    fn clean(&mut self) -> usize {
        self.store.cleanup_expired()
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}
