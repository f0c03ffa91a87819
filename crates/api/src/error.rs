use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use identity_core::error::CoreError;
use identity_core::ports::FileStoreError;
use serde_json::json;
use uuid::Uuid;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `identity_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A file store failure (uploads).
    #[error("File store error: {0}")]
    Files(#[from] FileStoreError),

    /// The editing session does not exist or was already completed.
    #[error("Editing session not found: {0}")]
    SessionNotFound(Uuid),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(error: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %error, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Field errors get their own body shape so the form can show them inline.
            AppError::Core(CoreError::Validation(errors)) => {
                let body = json!({
                    "error": self.to_string(),
                    "code": "VALIDATION_ERROR",
                    "errors": errors,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }
            AppError::Core(CoreError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", self.to_string())
            }
            AppError::Core(CoreError::Store(err)) => internal(err),
            AppError::Files(FileStoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Asset {id} not found"),
            ),
            AppError::Files(err) => internal(err),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Editing session {id} not found"),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
