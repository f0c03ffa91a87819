//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::ports::{
    Asset, AssetStatus, FileStore, FileStoreError, SettingsStore, StoreError, UsageOwner,
};
use crate::types::AssetId;

/// Settings store that counts saves and can be told to fail them.
///
/// `values` holds what was saved; `staged` what was set since.
#[derive(Debug, Default)]
pub struct RecordingSettings {
    pub values: HashMap<String, Value>,
    pub staged: HashMap<String, Value>,
    pub saves: usize,
    pub fail_save: bool,
}

impl RecordingSettings {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.staged.is_empty()
    }
}

impl SettingsStore for RecordingSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.staged
            .get(key)
            .or_else(|| self.values.get(key))
            .cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.staged.insert(key.to_string(), value);
        self
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let staged = std::mem::take(&mut self.staged);
        if self.fail_save {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.values.extend(staged);
        self.saves += 1;
        Ok(())
    }
}

/// File store that records permanence and usage calls.
#[derive(Debug, Default)]
pub struct FakeFiles {
    pub assets: BTreeMap<AssetId, Asset>,
    pub permanent: Vec<AssetId>,
    pub usages: Vec<(AssetId, UsageOwner)>,
    pub fail_writes: bool,
}

impl FakeFiles {
    pub fn with_temporary(id: AssetId) -> Self {
        let mut files = Self::default();
        files.assets.insert(
            id,
            Asset {
                id,
                file_name: format!("{id}.png"),
                uri: format!("identity/{id}.png"),
                status: AssetStatus::Temporary,
            },
        );
        files
    }
}

impl FileStore for FakeFiles {
    fn load_asset(&self, id: AssetId) -> Option<Asset> {
        self.assets.get(&id).cloned()
    }

    fn mark_permanent(&mut self, asset: &Asset) -> Result<(), FileStoreError> {
        if self.fail_writes {
            return Err(FileStoreError::Io(std::io::Error::other("read-only")));
        }
        let entry = self
            .assets
            .get_mut(&asset.id)
            .ok_or(FileStoreError::NotFound(asset.id))?;
        entry.status = AssetStatus::Permanent;
        self.permanent.push(asset.id);
        Ok(())
    }

    fn register_usage(&mut self, asset: &Asset, owner: &UsageOwner) -> Result<(), FileStoreError> {
        if self.fail_writes {
            return Err(FileStoreError::Io(std::io::Error::other("read-only")));
        }
        self.usages.push((asset.id, owner.clone()));
        Ok(())
    }

    fn resolve_absolute_url(&self, asset: &Asset) -> String {
        format!("https://files.example/{}", asset.uri)
    }
}
