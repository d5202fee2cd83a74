//! Key-value store backends
//!
//! Every piece of board state lives under a string key with a string value,
//! the same shape as a browser's local storage. Two backends:
//!
//! ```text
//! <data dir>/
//!   store.json        # FileStore: {"tasks": "[...]", "showSideBar": "true", ...}
//!   store.json.lock   # advisory lock held while store.json is rewritten
//!   kanban.toml       # configuration (see config module)
//! ```
//!
//! `MemoryStore` keeps the same map in process and is used by tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the store file inside the data directory
pub const STORE_FILE: &str = "store.json";

/// String-keyed, string-valued persistent store.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if the key was never set.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key.
    fn clear(&self) -> Result<()>;

    /// All keys currently set, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

type Entries = BTreeMap<String, String>;

/// Store backed by a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store in `dir`. Nothing is created until the first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory holding the store file
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to `store.json`
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn read_entries(&self) -> Result<Entries> {
        let path = self.path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content)
            .map_err(|err| Error::CorruptState(format!("{}: {err}", path.display())))
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        lock::write_atomic(self.path(), json.as_bytes())
    }

    /// Read-modify-write of the whole file under the store lock.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Entries) -> T,
    {
        let path = self.path();
        let _lock = FileLock::acquire(lock::lock_path_for(&path), DEFAULT_LOCK_TIMEOUT_MS)?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(Error::CorruptState(reason)) => {
                // The file is not a key-value object at all; a write replaces it.
                tracing::warn!(%reason, "store file unreadable, rewriting from empty");
                Entries::new()
            }
            Err(err) => return Err(err),
        };

        let result = f(&mut entries);
        self.write_entries(&entries)?;
        Ok(result)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        tracing::trace!(key, bytes = value.len(), "set_item");
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(|entries| entries.clear())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_entries()?.into_keys().collect())
    }
}

/// In-process store; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> Error {
        Error::OperationFailed("memory store lock poisoned".to_string())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}
