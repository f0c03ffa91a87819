//! Settings store implementations.

use std::path::PathBuf;

use identity_core::ports::{SettingsStore, StoreError};
use serde_json::{Map, Value};

use crate::atomic::write_atomically;

/// Settings persisted as a single JSON object on disk.
///
/// `set` only stages values in memory; `save` rewrites the whole document
/// and either commits the staged values or drops them.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    saved: Map<String, Value>,
    staged: Map<String, Value>,
}

impl JsonFileSettingsStore {
    /// Open the document at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let saved = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes)? {
                Value::Object(map) => map,
                other => {
                    return Err(StoreError::Malformed {
                        key: path.display().to_string(),
                        reason: format!("expected a JSON object, found {other}"),
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = saved.len(), "Opened settings store");
        Ok(Self {
            path,
            saved,
            staged: Map::new(),
        })
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.staged
            .get(key)
            .or_else(|| self.saved.get(key))
            .cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.staged.insert(key.to_string(), value);
        self
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let staged = std::mem::take(&mut self.staged);
        let mut next = self.saved.clone();
        next.extend(staged);

        let bytes = serde_json::to_vec_pretty(&next)?;
        if let Err(e) = write_atomically(&self.path, &bytes) {
            tracing::warn!(path = %self.path.display(), error = %e, "Settings save failed, staged values dropped");
            return Err(e.into());
        }

        self.saved = next;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// Settings kept in memory only. Counts saves.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Map<String, Value>,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.values.insert(key.to_string(), value);
        self
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }
}
