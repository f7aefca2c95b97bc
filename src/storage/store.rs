//! String-keyed persistent stores
//!
//! `KeyValueStore` is the seam the tab registry persists through. Two
//! implementations live here: an in-memory map for tests and embedding, and
//! a single JSON object file on disk.

use super::io::write_file_atomic_sync;
use crate::error::{StoreError, StoreResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A string-keyed store of string values. Writes are last-write-wins.
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&mut self, key: &str, value: String) -> StoreResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by one JSON object file (`{"key": "value", ...}`)
///
/// Every `put` rewrites the whole file atomically. A corrupted file reads
/// as an error and is replaced on the next write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| StoreError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Encode {
            key: self.path.display().to_string(),
            source: e,
        })?;
        write_file_atomic_sync(&self.path, &content)
    }

    /// Entries for a read-modify-write; a corrupted file starts over empty
    fn entries_for_update(&self) -> StoreResult<BTreeMap<String, String>> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(StoreError::Corrupted { path, source }) => {
                log::warn!(
                    "Discarding corrupted store {}: {}",
                    path.display(),
                    source
                );
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        let mut entries = self.entries_for_update()?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries_for_update()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
