//! Collaborator interfaces the editor and renderer are wired to.
//!
//! Implementations are injected through constructor parameters; nothing in
//! this crate looks them up globally. `identity-store` provides the
//! file-backed and in-memory implementations used by the HTTP service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::SETTINGS_NAME;
use crate::types::AssetId;

// ---------------------------------------------------------------------------
// Settings store
// ---------------------------------------------------------------------------

/// Errors raised by a settings store. These are not recoverable by the
/// editor and propagate to the host.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Setting '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

/// Key/value configuration persistence with explicit save.
///
/// `set` stages a value and `get` sees it; nothing is durable until `save`
/// succeeds. A failed `save` discards everything staged since the last
/// successful one, so readers never see a write that did not land.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> &mut Self;

    fn save(&mut self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Lifecycle status of a stored file. Temporary files are eligible for
/// garbage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Temporary,
    Permanent,
}

/// A file known to the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub file_name: String,
    /// Location relative to the store's public root, e.g. `identity/ada.png`.
    pub uri: String,
    pub status: AssetStatus,
}

/// Who holds a reference to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageOwner {
    pub module: String,
    pub owner_type: String,
    pub owner_id: String,
}

impl UsageOwner {
    /// The usage recorded for the profile's avatar.
    pub fn profile_settings() -> Self {
        Self {
            module: "indieweb_identity".to_string(),
            owner_type: "config".to_string(),
            owner_id: SETTINGS_NAME.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("Asset not found: #{0}")]
    NotFound(AssetId),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File index error: {0}")]
    Index(#[from] serde_json::Error),
}

/// Uploaded-file persistence with permanence and usage tracking.
pub trait FileStore {
    fn load_asset(&self, id: AssetId) -> Option<Asset>;

    fn mark_permanent(&mut self, asset: &Asset) -> Result<(), FileStoreError>;

    fn register_usage(&mut self, asset: &Asset, owner: &UsageOwner)
        -> Result<(), FileStoreError>;

    fn resolve_absolute_url(&self, asset: &Asset) -> String;
}

// ---------------------------------------------------------------------------
// Origin provider
// ---------------------------------------------------------------------------

/// Supplies the site's scheme and host, e.g. `https://ada.example`.
pub trait OriginProvider {
    fn site_origin(&self) -> String;
}

/// An origin fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOrigin(pub String);

impl OriginProvider for StaticOrigin {
    fn site_origin(&self) -> String {
        self.0.clone()
    }
}
