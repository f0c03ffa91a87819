//! Profile validation: pure checks that gate persistence.
//!
//! Nothing here touches storage or mutates the candidate. Every error is
//! scoped to one field so the settings page can show it inline.

use std::fmt;

use serde::{Serialize, Serializer};
use validator::{ValidateEmail, ValidateUrl};

use crate::profile::{LinkRow, ProfileRecord};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorKind {
    RequiredFieldMissing,
    InvalidEmail,
    MissingTitle,
    InvalidUrl,
}

/// The form field an error is attached to. Row indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Name,
    Email,
    LinkTitle(usize),
    LinkUrl(usize),
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Email => f.write_str("email"),
            Self::LinkTitle(i) => write!(f, "social_links.{i}.title"),
            Self::LinkUrl(i) => write!(f, "social_links.{i}.url"),
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub field: FieldPath,
    pub message: String,
}

impl FieldError {
    fn new(kind: FieldErrorKind, field: FieldPath, message: String) -> Self {
        Self {
            kind,
            field,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

/// The name is the only required field.
pub fn validate_name(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        return Some(FieldError::new(
            FieldErrorKind::RequiredFieldMissing,
            FieldPath::Name,
            "Full Name field is required.".to_string(),
        ));
    }
    None
}

/// An empty email is valid; anything else must be a syntactically valid
/// address.
pub fn validate_email(value: &str) -> Option<FieldError> {
    let email = value.trim();
    if email.is_empty() || email.validate_email() {
        return None;
    }
    Some(FieldError::new(
        FieldErrorKind::InvalidEmail,
        FieldPath::Email,
        format!("The email address {email} is not valid."),
    ))
}

/// Validate one link row at 0-based `index`.
///
/// Rows with an empty URL are skipped entirely; they are dropped before
/// persistence. Title and URL are checked independently, so a row can
/// produce two errors.
pub fn validate_link_row(row: &LinkRow, index: usize) -> Vec<FieldError> {
    let url = row.url.trim();
    if url.is_empty() {
        return Vec::new();
    }

    let number = index + 1;
    let mut errors = Vec::new();

    if row.title.trim().is_empty() {
        errors.push(FieldError::new(
            FieldErrorKind::MissingTitle,
            FieldPath::LinkTitle(index),
            format!("Link #{number}: Please provide a title."),
        ));
    }
    if !is_absolute_url(url) {
        errors.push(FieldError::new(
            FieldErrorKind::InvalidUrl,
            FieldPath::LinkUrl(index),
            format!("Link #{number}: Invalid URL."),
        ));
    }

    errors
}

/// Validate a full candidate record.
///
/// Errors are ordered name, email, then link rows in submitted order. An
/// empty result means the record may be persisted.
pub fn validate_record(candidate: &ProfileRecord) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = validate_name(&candidate.name).into_iter().collect();
    errors.extend(validate_email(candidate.email.as_deref().unwrap_or_default()));
    for (index, row) in candidate.social_links.iter().enumerate() {
        errors.extend(validate_link_row(row, index));
    }
    errors
}

/// Absolute means it parses without a base: scheme required.
fn is_absolute_url(value: &str) -> bool {
    value.validate_url()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
