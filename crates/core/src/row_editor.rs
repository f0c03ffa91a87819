//! Row collection editor: how many social-link slots the settings page shows.
//!
//! The count lives in an explicit [`EditorSession`] that the caller keeps
//! between requests. It is seeded once from the persisted links and then
//! only grows; there is no remove-row operation.

use serde::{Deserialize, Serialize};

use crate::controller::EditorPhase;
use crate::profile::LinkRow;

/// Minimum number of link slots on the page.
pub const MIN_ROWS: usize = 1;

/// Transient state for one operator's in-progress edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSession {
    row_count: Option<usize>,
    phase: EditorPhase,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current slot count, or `None` before the first load.
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: EditorPhase) {
        self.phase = phase;
    }

    /// Forget the row count and return to `Loading`.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Seed the session's row count from the persisted links.
///
/// Returns `max(persisted.len(), 1)` the first time; every later call in
/// the same session returns the current count unchanged.
pub fn initialize(session: &mut EditorSession, persisted: &[LinkRow]) -> usize {
    *session
        .row_count
        .get_or_insert_with(|| persisted.len().max(MIN_ROWS))
}

/// One more slot than `current`.
pub fn add_row(current: usize) -> usize {
    current + 1
}

/// Grow the session by one slot and return the new count.
///
/// An uninitialized session is treated as holding the minimum.
pub fn add_row_to(session: &mut EditorSession) -> usize {
    let next = add_row(session.row_count.unwrap_or(MIN_ROWS));
    session.row_count = Some(next);
    next
}

// ---------------------------------------------------------------------------
// Slot layout
// ---------------------------------------------------------------------------

/// One editable title/URL pair on the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSlot {
    /// 0-based position.
    pub index: usize,
    /// Heading shown above the pair, e.g. `Social Link #1`.
    pub label: String,
    pub title: String,
    pub url: String,
}

/// Lay out exactly `row_count` slots, keeping already-typed values.
///
/// `draft` holds what the operator has entered so far (or the persisted
/// links on first render). Slots beyond the draft are blank; draft rows
/// beyond `row_count` are not shown.
pub fn build_slots(row_count: usize, draft: &[LinkRow]) -> Vec<RowSlot> {
    (0..row_count.max(MIN_ROWS))
        .map(|index| {
            let row = draft.get(index).cloned().unwrap_or_default();
            RowSlot {
                index,
                label: format!("Social Link #{}", index + 1),
                title: row.title,
                url: row.url,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
