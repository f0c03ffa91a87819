//! Profile editor controller: one load → edit → validate → persist cycle.
//!
//! The controller is request-scoped. It borrows the injected collaborators
//! for the duration of one operator action, while the [`EditorSession`] it
//! drives is owned by the caller and survives between actions.
//!
//! ```text
//! Loading ──load──▶ Editing ──submit──▶ Validating ──errors──▶ Editing
//!                     │  ▲                   │
//!                     └──┘ add_row           └──ok──▶ Persisting ──▶ Done
//! ```
//!
//! `load` after `Done` starts a fresh session.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feedback::{self, Ack, DEFAULT_VALIDATOR_BASE};
use crate::ports::{FileStore, OriginProvider, SettingsStore, UsageOwner};
use crate::profile::{reduce_links, ProfileRecord};
use crate::row_editor::{self, EditorSession};
use crate::types::AssetId;
use crate::validation;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorPhase {
    #[default]
    Loading,
    Editing,
    Validating,
    Persisting,
    Done,
}

impl EditorPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for EditorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_editing(session: &EditorSession, action: &'static str) -> Result<(), CoreError> {
    match session.phase() {
        EditorPhase::Editing => Ok(()),
        phase => Err(CoreError::InvalidTransition { action, phase }),
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct ProfileEditorController<'a, S, F, O> {
    settings: &'a mut S,
    files: &'a mut F,
    origin: &'a O,
    validator_base: String,
}

impl<'a, S, F, O> ProfileEditorController<'a, S, F, O>
where
    S: SettingsStore,
    F: FileStore,
    O: OriginProvider,
{
    pub fn new(settings: &'a mut S, files: &'a mut F, origin: &'a O) -> Self {
        Self {
            settings,
            files,
            origin,
            validator_base: DEFAULT_VALIDATOR_BASE.to_string(),
        }
    }

    /// Override the validator the post-save message links to.
    pub fn with_validator_base(mut self, base: impl Into<String>) -> Self {
        self.validator_base = base.into();
        self
    }

    /// Read the current profile and seed the session's row count.
    ///
    /// Safe to call again while editing (re-render): the row count is not
    /// reset. After `Done` the session starts over.
    pub fn load(&self, session: &mut EditorSession) -> Result<ProfileRecord, CoreError> {
        match session.phase() {
            EditorPhase::Loading | EditorPhase::Editing => {}
            EditorPhase::Done => session.reset(),
            phase => {
                return Err(CoreError::InvalidTransition {
                    action: "load",
                    phase,
                })
            }
        }

        let record = ProfileRecord::read_from(&*self.settings)?;
        let rows = row_editor::initialize(session, &record.social_links);
        session.set_phase(EditorPhase::Editing);

        tracing::debug!(rows, links = record.social_links.len(), "Profile loaded for editing");
        Ok(record)
    }

    /// "Add another link": one more slot, no validation.
    pub fn add_row_requested(&self, session: &mut EditorSession) -> Result<usize, CoreError> {
        require_editing(session, "add a row")?;
        let rows = row_editor::add_row_to(session);
        tracing::debug!(rows, "Link row added");
        Ok(rows)
    }

    /// Validate and persist a candidate record.
    ///
    /// `avatar_upload` is a newly uploaded file; when absent the candidate's
    /// own avatar reference is kept. On validation failure the session is
    /// back in `Editing` and neither store has been touched. A failed save
    /// also returns to `Editing` and leaves both stores as they were.
    pub fn submit(
        &mut self,
        session: &mut EditorSession,
        candidate: ProfileRecord,
        avatar_upload: Option<AssetId>,
    ) -> Result<Ack, CoreError> {
        require_editing(session, "submit")?;
        session.set_phase(EditorPhase::Validating);

        let errors = validation::validate_record(&candidate);
        if !errors.is_empty() {
            session.set_phase(EditorPhase::Editing);
            tracing::info!(errors = errors.len(), "Profile submission rejected");
            return Err(CoreError::Validation(errors));
        }

        session.set_phase(EditorPhase::Persisting);
        match self.persist(candidate, avatar_upload) {
            Ok(()) => {
                session.set_phase(EditorPhase::Done);
                let origin = self.origin.site_origin();
                Ok(feedback::build_ack(&origin, &self.validator_base))
            }
            Err(err) => {
                session.set_phase(EditorPhase::Editing);
                Err(err)
            }
        }
    }

    /// Save the whole record, then claim its avatar if it changed.
    ///
    /// The avatar is claimed whether it arrived as a fresh upload or as the
    /// candidate's own reference, so a saved profile never points at an
    /// unclaimed temporary file.
    fn persist(
        &mut self,
        candidate: ProfileRecord,
        avatar_upload: Option<AssetId>,
    ) -> Result<(), CoreError> {
        let previous_avatar = ProfileRecord::read_from(&*self.settings)?.avatar_asset_id;

        let record = ProfileRecord {
            avatar_asset_id: avatar_upload.or(candidate.avatar_asset_id),
            social_links: reduce_links(&candidate.social_links),
            ..candidate
        };
        record.write_to(&mut *self.settings);
        self.settings.save()?;

        if let Some(id) = record.avatar_asset_id {
            if previous_avatar != Some(id) {
                self.claim_avatar(id);
            }
        }

        tracing::info!(
            links = record.social_links.len(),
            avatar = ?record.avatar_asset_id,
            hidden = record.hidden,
            "Identity profile saved"
        );
        Ok(())
    }

    /// Mark a new avatar permanent and record the profile's usage of it.
    ///
    /// Best effort: a missing asset or a failing store call is logged and
    /// does not block the save.
    fn claim_avatar(&mut self, id: AssetId) {
        let Some(asset) = self.files.load_asset(id) else {
            tracing::warn!(asset_id = %id, "Avatar upload not found in file store, skipping");
            return;
        };

        if let Err(e) = self.files.mark_permanent(&asset) {
            tracing::warn!(asset_id = %id, error = %e, "Failed to mark avatar permanent");
            return;
        }
        if let Err(e) = self
            .files
            .register_usage(&asset, &UsageOwner::profile_settings())
        {
            tracing::warn!(asset_id = %id, error = %e, "Failed to register avatar usage");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{AssetStatus, StaticOrigin};
    use crate::profile::LinkRow;
    use crate::testing::{FakeFiles, RecordingSettings};
    use crate::validation::{FieldErrorKind, FieldPath};
    use assert_matches::assert_matches;

    fn origin() -> StaticOrigin {
        StaticOrigin("https://ada.example".to_string())
    }

    fn candidate(name: &str, links: Vec<LinkRow>) -> ProfileRecord {
        ProfileRecord {
            name: name.to_string(),
            social_links: links,
            ..ProfileRecord::default()
        }
    }

    fn loaded_session(settings: &mut RecordingSettings, files: &mut FakeFiles) -> EditorSession {
        let origin = origin();
        let controller = ProfileEditorController::new(settings, files, &origin);
        let mut session = EditorSession::new();
        controller.load(&mut session).unwrap();
        session
    }

    // -- load --

    #[test]
    fn load_defaults_and_seeds_one_row() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let origin = origin();
        let controller = ProfileEditorController::new(&mut settings, &mut files, &origin);

        let mut session = EditorSession::new();
        let record = controller.load(&mut session).unwrap();

        assert!(record.hidden);
        assert!(record.social_links.is_empty());
        assert_eq!(session.row_count(), Some(1));
        assert_eq!(session.phase(), EditorPhase::Editing);
    }

    #[test]
    fn reload_while_editing_keeps_row_count() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let origin = origin();
        let controller = ProfileEditorController::new(&mut settings, &mut files, &origin);

        let mut session = EditorSession::new();
        controller.load(&mut session).unwrap();
        for _ in 0..3 {
            controller.add_row_requested(&mut session).unwrap();
        }
        controller.load(&mut session).unwrap();
        assert_eq!(session.row_count(), Some(4));
    }

    // -- add_row_requested --

    #[test]
    fn add_row_requires_a_loaded_session() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let origin = origin();
        let controller = ProfileEditorController::new(&mut settings, &mut files, &origin);

        let mut session = EditorSession::new();
        assert_matches!(
            controller.add_row_requested(&mut session),
            Err(CoreError::InvalidTransition {
                phase: EditorPhase::Loading,
                ..
            })
        );
    }

    #[test]
    fn add_row_does_not_touch_stores() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            assert_eq!(controller.add_row_requested(&mut session).unwrap(), 2);
        }
        assert_eq!(settings.saves, 0);
        assert!(settings.is_empty());
    }

    // -- submit: rejection --

    #[test]
    fn blank_name_is_rejected_without_saving() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::with_temporary(AssetId(5));
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            let result = controller.submit(&mut session, candidate("  ", vec![]), Some(AssetId(5)));
            assert_matches!(result, Err(CoreError::Validation(ref errors))
                if errors[0].kind == FieldErrorKind::RequiredFieldMissing);
        }
        assert_eq!(session.phase(), EditorPhase::Editing);
        assert_eq!(settings.saves, 0);
        assert!(files.permanent.is_empty());
        assert!(files.usages.is_empty());
    }

    #[test]
    fn invalid_email_and_untitled_link_report_two_errors() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        let mut record = candidate("Ada", vec![LinkRow::new("", "https://example.com")]);
        record.email = Some("not-an-email".to_string());

        let err = controller.submit(&mut session, record, None).unwrap_err();
        let errors = err.field_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, FieldPath::Email);
        assert_eq!(errors[1].field, FieldPath::LinkTitle(0));
        assert!(errors[1].message.contains("#1"));
    }

    #[test]
    fn rejected_submission_can_be_corrected_and_resubmitted() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        assert!(controller
            .submit(&mut session, candidate("", vec![]), None)
            .is_err());
        assert!(controller
            .submit(&mut session, candidate("Ada", vec![]), None)
            .is_ok());
        assert_eq!(session.phase(), EditorPhase::Done);
    }

    // -- submit: persistence --

    #[test]
    fn blank_rows_are_dropped_on_save() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            let record = candidate(
                "Ada",
                vec![
                    LinkRow::new("GitHub", "https://github.com/ada"),
                    LinkRow::new("", ""),
                ],
            );
            let ack = controller.submit(&mut session, record, None).unwrap();
            assert_eq!(ack.messages.len(), 2);
        }
        assert_eq!(settings.saves, 1);
        let saved = ProfileRecord::read_from(&settings).unwrap();
        assert_eq!(
            saved.social_links,
            vec![LinkRow::new("GitHub", "https://github.com/ada")]
        );
    }

    #[test]
    fn persist_then_load_round_trips_except_links() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let submitted = ProfileRecord {
            name: "Ada Lovelace".to_string(),
            nickname: Some("ada".to_string()),
            email: Some("ada@example.com".to_string()),
            bio: Some("Wrote the first program.".to_string()),
            avatar_asset_id: None,
            hidden: false,
            social_links: vec![
                LinkRow::new(" GitHub ", " https://github.com/ada "),
                LinkRow::new("Ignored", " "),
            ],
        };

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        controller
            .submit(&mut session, submitted.clone(), None)
            .unwrap();

        let mut next = EditorSession::new();
        let loaded = controller.load(&mut next).unwrap();
        assert_eq!(
            loaded,
            ProfileRecord {
                social_links: vec![LinkRow::new("GitHub", "https://github.com/ada")],
                ..submitted
            }
        );
        assert_eq!(next.row_count(), Some(1));
    }

    #[test]
    fn save_replaces_the_whole_record() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut first = ProfileRecord {
            name: "Ada".to_string(),
            nickname: Some("ada".to_string()),
            ..ProfileRecord::default()
        };
        first.social_links = vec![LinkRow::new("A", "https://a.example")];
        first.write_to(&mut settings);

        let mut session = loaded_session(&mut settings, &mut files);
        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        controller
            .submit(&mut session, candidate("Grace", vec![]), None)
            .unwrap();

        let loaded = controller.load(&mut EditorSession::new()).unwrap();
        assert_eq!(loaded.name, "Grace");
        assert_eq!(loaded.nickname, None);
        assert!(loaded.social_links.is_empty());
    }

    #[test]
    fn submit_after_done_is_rejected() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        controller
            .submit(&mut session, candidate("Ada", vec![]), None)
            .unwrap();
        assert_matches!(
            controller.submit(&mut session, candidate("Ada", vec![]), None),
            Err(CoreError::InvalidTransition {
                phase: EditorPhase::Done,
                ..
            })
        );
        assert_matches!(
            controller.add_row_requested(&mut session),
            Err(CoreError::InvalidTransition { .. })
        );
    }

    #[test]
    fn load_after_done_starts_a_fresh_session() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        controller.add_row_requested(&mut session).unwrap();
        controller.add_row_requested(&mut session).unwrap();
        let links = vec![
            LinkRow::new("A", "https://a.example"),
            LinkRow::new("B", "https://b.example"),
        ];
        controller
            .submit(&mut session, candidate("Ada", links), None)
            .unwrap();

        controller.load(&mut session).unwrap();
        assert_eq!(session.row_count(), Some(2));
        assert_eq!(session.phase(), EditorPhase::Editing);
    }

    #[test]
    fn failed_save_returns_to_editing() {
        let mut settings = RecordingSettings {
            fail_save: true,
            ..RecordingSettings::default()
        };
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        assert_matches!(
            controller.submit(&mut session, candidate("Ada", vec![]), None),
            Err(CoreError::Store(_))
        );
        assert_eq!(session.phase(), EditorPhase::Editing);
    }

    #[test]
    fn failed_save_leaves_stores_untouched() {
        let mut settings = RecordingSettings::default();
        ProfileRecord {
            name: "Ada".to_string(),
            ..ProfileRecord::default()
        }
        .write_to(&mut settings);
        settings.save().unwrap();
        settings.fail_save = true;

        let mut files = FakeFiles::with_temporary(AssetId(1));
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            assert!(controller
                .submit(&mut session, candidate("Unsaved", vec![]), Some(AssetId(1)))
                .is_err());
        }

        let current = ProfileRecord::read_from(&settings).unwrap();
        assert_eq!(current.name, "Ada");
        assert_eq!(current.avatar_asset_id, None);
        assert!(files.permanent.is_empty());
        assert!(files.usages.is_empty());
        assert_eq!(
            files.load_asset(AssetId(1)).map(|a| a.status),
            Some(AssetStatus::Temporary)
        );
    }

    // -- submit: avatar --

    #[test]
    fn new_avatar_is_made_permanent_with_usage() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::with_temporary(AssetId(9));
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            controller
                .submit(&mut session, candidate("Ada", vec![]), Some(AssetId(9)))
                .unwrap();
        }
        assert_eq!(files.permanent, vec![AssetId(9)]);
        assert_eq!(
            files.usages,
            vec![(AssetId(9), UsageOwner::profile_settings())]
        );
        assert_eq!(
            ProfileRecord::read_from(&settings).unwrap().avatar_asset_id,
            Some(AssetId(9))
        );
    }

    #[test]
    fn unchanged_avatar_is_not_claimed_again() {
        let mut settings = RecordingSettings::default();
        ProfileRecord {
            name: "Ada".to_string(),
            avatar_asset_id: Some(AssetId(9)),
            ..ProfileRecord::default()
        }
        .write_to(&mut settings);
        let mut files = FakeFiles::with_temporary(AssetId(9));
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            controller
                .submit(&mut session, candidate("Ada", vec![]), Some(AssetId(9)))
                .unwrap();
        }
        assert!(files.permanent.is_empty());
        assert!(files.usages.is_empty());
    }

    #[test]
    fn missing_avatar_asset_does_not_block_save() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            controller
                .submit(&mut session, candidate("Ada", vec![]), Some(AssetId(404)))
                .unwrap();
        }
        assert_eq!(settings.saves, 1);
        assert!(files.permanent.is_empty());
    }

    #[test]
    fn failing_permanence_marking_does_not_block_save() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles {
            fail_writes: true,
            ..FakeFiles::with_temporary(AssetId(3))
        };
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            assert!(controller
                .submit(&mut session, candidate("Ada", vec![]), Some(AssetId(3)))
                .is_ok());
        }
        assert_eq!(settings.saves, 1);
        assert_eq!(
            files.load_asset(AssetId(3)).map(|a| a.status),
            Some(AssetStatus::Temporary)
        );
    }

    #[test]
    fn candidate_avatar_is_kept_without_upload() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
        let record = ProfileRecord {
            avatar_asset_id: Some(AssetId(2)),
            ..candidate("Ada", vec![])
        };
        controller.submit(&mut session, record, None).unwrap();
        let loaded = controller.load(&mut EditorSession::new()).unwrap();
        assert_eq!(loaded.avatar_asset_id, Some(AssetId(2)));
    }

    #[test]
    fn changed_candidate_avatar_is_claimed() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::with_temporary(AssetId(2));
        let mut session = loaded_session(&mut settings, &mut files);
        {
            let origin = origin();
            let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin);
            let record = ProfileRecord {
                avatar_asset_id: Some(AssetId(2)),
                ..candidate("Ada", vec![])
            };
            controller.submit(&mut session, record, None).unwrap();
        }
        assert_eq!(files.permanent, vec![AssetId(2)]);
        assert_eq!(
            files.usages,
            vec![(AssetId(2), UsageOwner::profile_settings())]
        );
    }

    // -- feedback --

    #[test]
    fn ack_uses_configured_validator_and_origin() {
        let mut settings = RecordingSettings::default();
        let mut files = FakeFiles::default();
        let mut session = loaded_session(&mut settings, &mut files);

        let origin = origin();
        let mut controller = ProfileEditorController::new(&mut settings, &mut files, &origin)
            .with_validator_base("https://validator.example/check");
        let ack = controller
            .submit(&mut session, candidate("Ada", vec![]), None)
            .unwrap();
        assert_eq!(ack.messages[0].link.href, "https://ada.example");
        assert_eq!(
            ack.messages[1].link.href,
            "https://validator.example/check?url=https%3A%2F%2Fada.example"
        );
    }
}
