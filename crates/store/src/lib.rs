//! Storage backends for the identity profile.
//!
//! Implements the `identity_core::ports` traits on top of the local
//! filesystem: a JSON document for settings and an upload directory with
//! an index for files.

pub mod files;
pub mod settings;

mod atomic;

pub use files::LocalFileStore;
pub use settings::{JsonFileSettingsStore, MemorySettingsStore};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
