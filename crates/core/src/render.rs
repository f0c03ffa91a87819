//! Render adapter: persisted profile → props for the h-card component.
//!
//! All shaping happens at save time; rendering only copies values across,
//! resolves the avatar URL and applies the per-block visibility override.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ports::{FileStore, OriginProvider, SettingsStore};
use crate::profile::{LinkRow, ProfileRecord, SETTINGS_NAME};

/// The only display mode the component is driven with.
pub const DISPLAY_MODE_FULL: &str = "full";

/// Per-placement block settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Ignore the global "hidden" setting for this block instance.
    #[serde(default)]
    pub force_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderProps {
    pub name: String,
    pub url: String,
    /// Absolute avatar URL, empty when there is none.
    pub avatar: String,
    pub bio: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub social_links: Vec<LinkRow>,
    pub display_mode: &'static str,
    pub hidden: bool,
}

/// Hidden only when the profile says so and the block does not force it.
pub fn effective_hidden(hidden: bool, force_visible: bool) -> bool {
    hidden && !force_visible
}

pub fn to_render_props(
    record: &ProfileRecord,
    site_origin: &str,
    resolved_avatar_url: Option<String>,
    force_visible: bool,
) -> RenderProps {
    RenderProps {
        name: record.name.clone(),
        url: site_origin.to_string(),
        avatar: resolved_avatar_url.unwrap_or_default(),
        bio: record.bio.clone(),
        nickname: record.nickname.clone(),
        email: record.email.clone(),
        social_links: record.social_links.clone(),
        display_mode: DISPLAY_MODE_FULL,
        hidden: effective_hidden(record.hidden, force_visible),
    }
}

/// Cache tags the rendered card depends on; any profile save invalidates
/// them.
pub fn cache_tags() -> Vec<String> {
    vec![format!("config:{SETTINGS_NAME}")]
}

/// Reads the persisted profile and resolves it into [`RenderProps`].
pub struct RenderAdapter<'a, S, F, O> {
    settings: &'a S,
    files: &'a F,
    origin: &'a O,
}

impl<'a, S, F, O> RenderAdapter<'a, S, F, O>
where
    S: SettingsStore,
    F: FileStore,
    O: OriginProvider,
{
    pub fn new(settings: &'a S, files: &'a F, origin: &'a O) -> Self {
        Self {
            settings,
            files,
            origin,
        }
    }

    pub fn build(&self, block: &BlockConfig) -> Result<RenderProps, CoreError> {
        let record = ProfileRecord::read_from(self.settings)?;
        let avatar = self.resolve_avatar(&record);
        Ok(to_render_props(
            &record,
            &self.origin.site_origin(),
            avatar,
            block.force_visible,
        ))
    }

    /// An avatar that no longer loads renders as no avatar.
    fn resolve_avatar(&self, record: &ProfileRecord) -> Option<String> {
        let id = record.avatar_asset_id?;
        match self.files.load_asset(id) {
            Some(asset) => Some(self.files.resolve_absolute_url(&asset)),
            None => {
                tracing::debug!(asset_id = %id, "Avatar asset missing at render time");
                None
            }
        }
    }
}
