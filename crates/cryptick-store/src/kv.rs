//! Key-value blob store.
//!
//! State is a flat map of string keys to opaque JSON values. The file
//! implementation rewrites the whole document on every update; the
//! blobs are small user-state structures, not market data.

use crate::error::StoreResult;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Narrow persistence contract for user state.
///
/// Absent keys return `None`; callers substitute their empty defaults.
pub trait KeyValueStore: Send {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value) -> StoreResult<()>;
}

/// A shared store handle can be used wherever a store is expected.
impl<S: KeyValueStore> KeyValueStore for Arc<Mutex<S>> {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.lock().get_value(key)
    }

    fn set_value(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.lock().set_value(key, value)
    }
}

/// JSON-file-backed store.
pub struct JsonFileStore {
    path: PathBuf,
    entries: serde_json::Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing state if present.
    ///
    /// A missing file is an empty store; an unreadable document is
    /// logged and treated as empty rather than blocking startup.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<serde_json::Map<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), ?e, "Unreadable store file, starting empty");
                    serde_json::Map::new()
                }
            }
        } else {
            serde_json::Map::new()
        };

        info!(path = %path.display(), keys = entries.len(), "Opened store");
        Ok(Self { path, entries })
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: serde_json::Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
