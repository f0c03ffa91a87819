//! The persisted identity profile and its social-link rows.
//!
//! The record lives in the settings store as one key per field under the
//! `indieweb_identity.settings` configuration object. Reading fills in
//! defaults for anything that was never saved; writing always overwrites
//! every key (there is no field-level persistence).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::{SettingsStore, StoreError};
use crate::types::AssetId;

// ---------------------------------------------------------------------------
// Settings keys
// ---------------------------------------------------------------------------

/// Name of the configuration object holding the profile.
pub const SETTINGS_NAME: &str = "indieweb_identity.settings";

pub const KEY_NAME: &str = "name";
pub const KEY_NICKNAME: &str = "nickname";
pub const KEY_EMAIL: &str = "email";
pub const KEY_BIO: &str = "bio";
pub const KEY_AVATAR_ASSET_ID: &str = "avatar_asset_id";
pub const KEY_HIDDEN: &str = "hidden";
pub const KEY_SOCIAL_LINKS: &str = "social_links";

/// The card is visually hidden unless the operator opts out.
pub const DEFAULT_HIDDEN: bool = true;

// ---------------------------------------------------------------------------
// LinkRow
// ---------------------------------------------------------------------------

/// One title/URL pair in the social-links collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRow {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl LinkRow {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// A row whose URL is empty after trimming is never persisted.
    pub fn is_blank(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// Copy of the row with surrounding whitespace removed from both fields.
    pub fn trimmed(&self) -> Self {
        Self::new(self.title.trim(), self.url.trim())
    }
}

/// Drop rows with an empty trimmed URL and trim the survivors.
///
/// Order is preserved; the title of a dropped row is irrelevant.
pub fn reduce_links(rows: &[LinkRow]) -> Vec<LinkRow> {
    rows.iter()
        .filter(|row| !row.is_blank())
        .map(LinkRow::trimmed)
        .collect()
}

// ---------------------------------------------------------------------------
// ProfileRecord
// ---------------------------------------------------------------------------

/// The persisted identity settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_asset_id: Option<AssetId>,
    #[serde(default = "default_hidden")]
    pub hidden: bool,
    #[serde(default)]
    pub social_links: Vec<LinkRow>,
}

fn default_hidden() -> bool {
    DEFAULT_HIDDEN
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            nickname: None,
            email: None,
            bio: None,
            avatar_asset_id: None,
            hidden: DEFAULT_HIDDEN,
            social_links: Vec::new(),
        }
    }
}

impl ProfileRecord {
    /// Read the record from the settings store, defaulting missing keys.
    ///
    /// Returns [`StoreError::Malformed`] when a key holds a value of the
    /// wrong shape.
    pub fn read_from<S: SettingsStore>(store: &S) -> Result<Self, StoreError> {
        let name = read_text(store, KEY_NAME)?.unwrap_or_default();
        let nickname = read_text(store, KEY_NICKNAME)?;
        let email = read_text(store, KEY_EMAIL)?;
        let bio = read_text(store, KEY_BIO)?;
        let avatar_asset_id = read_asset_id(store)?;
        let hidden = read_flag(store, KEY_HIDDEN)?.unwrap_or(DEFAULT_HIDDEN);

        let social_links = match store.get(KEY_SOCIAL_LINKS) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Malformed {
                key: KEY_SOCIAL_LINKS.to_string(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            name,
            nickname,
            email,
            bio,
            avatar_asset_id,
            hidden,
            social_links,
        })
    }

    /// Stage every field of the record in the settings store.
    ///
    /// Does not call `save()`; the caller decides when the write happens.
    pub fn write_to<S: SettingsStore>(&self, store: &mut S) {
        let links: Vec<Value> = self
            .social_links
            .iter()
            .map(|row| serde_json::json!({ "title": row.title, "url": row.url }))
            .collect();

        store
            .set(KEY_NAME, Value::String(self.name.clone()))
            .set(KEY_NICKNAME, optional_text(&self.nickname))
            .set(KEY_EMAIL, optional_text(&self.email))
            .set(KEY_BIO, optional_text(&self.bio))
            .set(
                KEY_AVATAR_ASSET_ID,
                self.avatar_asset_id
                    .map_or(Value::Null, |id| Value::from(id.0)),
            )
            .set(KEY_HIDDEN, Value::Bool(self.hidden))
            .set(KEY_SOCIAL_LINKS, Value::Array(links));
    }
}

fn optional_text(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::String)
}

fn malformed(key: &str, expected: &str, found: &Value) -> StoreError {
    StoreError::Malformed {
        key: key.to_string(),
        reason: format!("expected {expected}, found {found}"),
    }
}

fn read_text<S: SettingsStore>(store: &S, key: &str) -> Result<Option<String>, StoreError> {
    match store.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(malformed(key, "a string", &other)),
    }
}

/// Checkbox values may have been stored as `0`/`1` by older saves.
fn read_flag<S: SettingsStore>(store: &S, key: &str) -> Result<Option<bool>, StoreError> {
    match store.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64() != Some(0.0))),
        Some(other) => Err(malformed(key, "a boolean", &other)),
    }
}

/// Accepts a bare id or a single-element id list (the managed-file shape).
fn read_asset_id<S: SettingsStore>(store: &S) -> Result<Option<AssetId>, StoreError> {
    let value = match store.get(KEY_AVATAR_ASSET_ID) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        Some(value) => value,
    };

    value
        .as_i64()
        .map(|id| Some(AssetId(id)))
        .ok_or_else(|| malformed(KEY_AVATAR_ASSET_ID, "an asset id", &value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
