//! The settings page model: field definitions plus the current link slots.
//!
//! Built fresh on every render from the session's row count and whatever
//! the operator has typed so far, so a re-render never loses input.

use serde::Serialize;
use serde_json::Value;

use crate::profile::{
    ProfileRecord, KEY_AVATAR_ASSET_ID, KEY_BIO, KEY_EMAIL, KEY_HIDDEN, KEY_NAME, KEY_NICKNAME,
};
use crate::row_editor::{build_slots, EditorSession, RowSlot, MIN_ROWS};
use crate::validation::FieldError;

/// Widget used to edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    File,
    TextArea,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileForm {
    pub fields: Vec<FormField>,
    pub row_count: usize,
    pub social_links: Vec<RowSlot>,
    pub errors: Vec<FieldError>,
}

impl ProfileForm {
    /// Lay out the page for `draft`, showing as many link slots as the
    /// session currently holds.
    pub fn build(session: &EditorSession, draft: &ProfileRecord, errors: Vec<FieldError>) -> Self {
        let row_count = session
            .row_count()
            .unwrap_or_else(|| draft.social_links.len().max(MIN_ROWS));

        Self {
            fields: field_defs(draft),
            row_count,
            social_links: build_slots(row_count, &draft.social_links),
            errors,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

fn text_value(value: &Option<String>) -> Value {
    Value::String(value.clone().unwrap_or_default())
}

fn field_defs(draft: &ProfileRecord) -> Vec<FormField> {
    vec![
        FormField {
            key: KEY_NAME,
            label: "Full Name",
            kind: FieldKind::Text,
            required: true,
            description: None,
            value: Value::String(draft.name.clone()),
        },
        FormField {
            key: KEY_NICKNAME,
            label: "Nickname",
            kind: FieldKind::Text,
            required: false,
            description: Some("This will receive the p-nickname class."),
            value: text_value(&draft.nickname),
        },
        FormField {
            key: KEY_EMAIL,
            label: "Email Address",
            kind: FieldKind::Email,
            required: false,
            description: Some("This will receive the u-email class."),
            value: text_value(&draft.email),
        },
        FormField {
            key: KEY_AVATAR_ASSET_ID,
            label: "Avatar Image",
            kind: FieldKind::File,
            required: false,
            description: None,
            value: draft
                .avatar_asset_id
                .map_or(Value::Null, |id| Value::from(id.0)),
        },
        FormField {
            key: KEY_BIO,
            label: "Bio / Note",
            kind: FieldKind::TextArea,
            required: false,
            description: None,
            value: text_value(&draft.bio),
        },
        FormField {
            key: KEY_HIDDEN,
            label: "Hidden",
            kind: FieldKind::Checkbox,
            required: false,
            description: Some("Should the h-card be visually hidden?"),
            value: Value::Bool(draft.hidden),
        },
    ]
}
