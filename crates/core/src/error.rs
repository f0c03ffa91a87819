use crate::controller::EditorPhase;
use crate::ports::StoreError;
use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The candidate record failed validation. Recoverable: the session is
    /// back in `Editing` and nothing was persisted.
    #[error("Validation failed with {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Cannot {action} while the editing session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: EditorPhase,
    },

    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Field errors carried by a validation failure, empty for other kinds.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}
