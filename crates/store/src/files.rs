//! Local upload directory with a JSON index of assets.
//!
//! Uploads start out temporary. Only assets that were marked permanent, or
//! that some owner still uses, survive [`LocalFileStore::purge_temporary`].

use std::fs;
use std::path::{Path, PathBuf};

use identity_core::ports::{Asset, AssetStatus, FileStore, FileStoreError, UsageOwner};
use identity_core::types::{AssetId, DbId};
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomically;
use crate::Timestamp;

/// File name of the index inside the store root.
pub const INDEX_FILE: &str = "index.json";

/// Directory (relative to the root) avatar uploads land in.
pub const UPLOAD_SUBDIR: &str = "identity";

/// How many times an owner references an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(flatten)]
    pub owner: UsageOwner,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetEntry {
    #[serde(flatten)]
    asset: Asset,
    created_at: Timestamp,
    #[serde(default)]
    usages: Vec<UsageRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    next_id: DbId,
    assets: Vec<AssetEntry>,
}

#[derive(Debug)]
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
    index: Index,
}

impl LocalFileStore {
    /// Open (or create) a store rooted at `root`, serving files from
    /// `public_base_url`.
    pub fn open(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, FileStoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(UPLOAD_SUBDIR))?;

        let index = match fs::read(root.join(INDEX_FILE)) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Index::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(root = %root.display(), assets = index.assets.len(), "Opened file store");
        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
            index,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an upload as a temporary asset.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<Asset, FileStoreError> {
        self.upload_at(file_name, bytes, chrono::Utc::now())
    }

    pub fn upload_at(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        now: Timestamp,
    ) -> Result<Asset, FileStoreError> {
        self.index.next_id += 1;
        let id = AssetId(self.index.next_id);
        let file_name = sanitize_file_name(file_name);
        let uri = format!("{UPLOAD_SUBDIR}/{id}-{file_name}");

        write_atomically(&self.root.join(&uri), bytes)?;

        let asset = Asset {
            id,
            file_name,
            uri,
            status: AssetStatus::Temporary,
        };
        self.index.assets.push(AssetEntry {
            asset: asset.clone(),
            created_at: now,
            usages: Vec::new(),
        });
        self.persist_index()?;

        tracing::info!(asset_id = %id, size = bytes.len(), "Stored temporary upload");
        Ok(asset)
    }

    /// Usage records for an asset, empty when unknown.
    pub fn usages(&self, id: AssetId) -> Vec<UsageRecord> {
        self.entry(id).map(|e| e.usages.clone()).unwrap_or_default()
    }

    /// Delete temporary, unused assets created more than `max_age` before
    /// `now`. Returns the removed ids.
    ///
    /// An asset whose file cannot be deleted stays indexed so a later purge
    /// retries it.
    pub fn purge_temporary(
        &mut self,
        max_age: chrono::TimeDelta,
        now: Timestamp,
    ) -> Result<Vec<AssetId>, FileStoreError> {
        // Nothing can be older than the earliest representable instant.
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return Ok(Vec::new());
        };

        let (expired, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.index.assets)
                .into_iter()
                .partition(|e| {
                    e.asset.status == AssetStatus::Temporary
                        && e.usages.is_empty()
                        && e.created_at < cutoff
                });
        self.index.assets = kept;

        let mut removed = Vec::with_capacity(expired.len());
        for entry in expired {
            match fs::remove_file(self.root.join(&entry.asset.uri)) {
                Ok(()) => removed.push(entry.asset.id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => removed.push(entry.asset.id),
                Err(e) => {
                    tracing::warn!(asset_id = %entry.asset.id, error = %e, "Failed to delete expired upload");
                    self.index.assets.push(entry);
                }
            }
        }

        if !removed.is_empty() {
            self.index.assets.sort_by_key(|e| e.asset.id.0);
            self.persist_index()?;
            tracing::info!(count = removed.len(), "Purged temporary uploads");
        }
        Ok(removed)
    }

    fn entry(&self, id: AssetId) -> Option<&AssetEntry> {
        self.index.assets.iter().find(|e| e.asset.id == id)
    }

    fn entry_mut(&mut self, id: AssetId) -> Result<&mut AssetEntry, FileStoreError> {
        self.index
            .assets
            .iter_mut()
            .find(|e| e.asset.id == id)
            .ok_or(FileStoreError::NotFound(id))
    }

    fn persist_index(&self) -> Result<(), FileStoreError> {
        let bytes = serde_json::to_vec_pretty(&self.index)?;
        write_atomically(&self.root.join(INDEX_FILE), &bytes)?;
        Ok(())
    }
}

impl FileStore for LocalFileStore {
    fn load_asset(&self, id: AssetId) -> Option<Asset> {
        self.entry(id).map(|e| e.asset.clone())
    }

    fn mark_permanent(&mut self, asset: &Asset) -> Result<(), FileStoreError> {
        let entry = self.entry_mut(asset.id)?;
        entry.asset.status = AssetStatus::Permanent;
        self.persist_index()?;
        tracing::debug!(asset_id = %asset.id, "Asset marked permanent");
        Ok(())
    }

    fn register_usage(&mut self, asset: &Asset, owner: &UsageOwner) -> Result<(), FileStoreError> {
        let entry = self.entry_mut(asset.id)?;
        match entry.usages.iter_mut().find(|u| &u.owner == owner) {
            Some(usage) => usage.count += 1,
            None => entry.usages.push(UsageRecord {
                owner: owner.clone(),
                count: 1,
            }),
        }
        self.persist_index()?;
        tracing::debug!(asset_id = %asset.id, owner = %owner.owner_id, "Asset usage registered");
        Ok(())
    }

    fn resolve_absolute_url(&self, asset: &Asset) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), asset.uri)
    }
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
