use std::fmt;

use serde::{Deserialize, Serialize};

/// File store primary keys are sequential integers.
pub type DbId = i64;

/// Opaque reference to a file held by the file store.
///
/// The profile only stores the reference; permanence and usage tracking are
/// owned by the file store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub DbId);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
