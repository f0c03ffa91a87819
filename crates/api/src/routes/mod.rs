pub mod health;
pub mod identity;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /identity/sessions                 start an editing session (POST)
/// /identity/sessions/{id}            re-render (GET), submit (PUT)
/// /identity/sessions/{id}/rows       add another link (POST)
/// /identity/avatar                   upload an avatar (POST, multipart)
/// /identity/hcard                    render props (GET ?force_visible)
/// /identity/help                     help page (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/identity", identity::router())
}
