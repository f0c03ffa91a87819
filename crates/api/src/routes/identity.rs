//! Route definitions for the identity profile editor.
//!
//! ```text
//! POST   /sessions              start_session
//! GET    /sessions/{id}         get_session
//! PUT    /sessions/{id}         submit
//! POST   /sessions/{id}/rows    add_row
//! POST   /avatar                upload_avatar
//! GET    /hcard                 render_hcard (?force_visible)
//! GET    /help                  help
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::identity;
use crate::state::AppState;

/// Identity routes -- mounted at `/identity`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(identity::start_session))
        .route(
            "/sessions/{id}",
            get(identity::get_session).put(identity::submit),
        )
        .route("/sessions/{id}/rows", post(identity::add_row))
        .route("/avatar", post(identity::upload_avatar))
        .route("/hcard", get(identity::render_hcard))
        .route("/help", get(identity::help))
}
