//! Handlers for the identity profile editor and h-card rendering.
//!
//! Each editor request runs one controller action against a session held in
//! the [`SessionRegistry`](crate::sessions::SessionRegistry). The stores are
//! locked only for the duration of that action.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use identity_core::controller::{EditorPhase, ProfileEditorController};
use identity_core::error::CoreError;
use identity_core::feedback::Ack;
use identity_core::form::ProfileForm;
use identity_core::help::{help_page, HelpPage, SETTINGS_INTRO};
use identity_core::ports::{Asset, FileStore};
use identity_core::profile::ProfileRecord;
use identity_core::render::{cache_tags, BlockConfig, RenderAdapter, RenderProps};
use identity_core::row_editor::EditorSession;
use identity_core::types::AssetId;
use identity_store::{JsonFileSettingsStore, LocalFileStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::origin::RequestOrigin;
use crate::response::DataResponse;
use crate::state::{lock, AppState};

/// Image types accepted as an avatar.
pub const AVATAR_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg", "webp"];

const SETTINGS_PATH: &str = "/api/v1/identity/sessions";
const HCARD_PATH: &str = "/api/v1/identity/hcard";

type Controller<'a> =
    ProfileEditorController<'a, JsonFileSettingsStore, LocalFileStore, RequestOrigin>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// The editable page for one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: EditorPhase,
    pub form: ProfileForm,
}

/// A freshly started session, with the persisted record it was seeded from.
#[derive(Debug, Serialize)]
pub struct StartedSession {
    #[serde(flatten)]
    pub view: SessionView,
    pub record: ProfileRecord,
}

/// Body of `PUT /sessions/{id}`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(flatten)]
    pub record: ProfileRecord,
    /// Asset id returned by `POST /avatar`, when a new avatar was uploaded.
    #[serde(default)]
    pub avatar_upload: Option<AssetId>,
}

#[derive(Debug, Serialize)]
pub struct UploadedAvatar {
    #[serde(flatten)]
    pub asset: Asset,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HCardQuery {
    #[serde(default)]
    pub force_visible: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderedHCard {
    pub props: RenderProps,
    pub cache_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HelpResponse {
    pub intro: &'static [&'static str],
    pub page: HelpPage,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run one controller action with both stores locked.
fn with_controller<R>(
    state: &AppState,
    origin: &RequestOrigin,
    session: &mut EditorSession,
    action: impl FnOnce(&mut Controller<'_>, &mut EditorSession) -> Result<R, CoreError>,
) -> Result<R, CoreError> {
    let mut settings = lock(&state.settings);
    let mut files = lock(&state.files);
    let mut controller = ProfileEditorController::new(&mut *settings, &mut *files, origin)
        .with_validator_base(state.config.validator_base_url.clone());
    action(&mut controller, session)
}

/// Run a controller action against a registered session.
fn in_session<R>(
    state: &AppState,
    origin: &RequestOrigin,
    id: Uuid,
    action: impl FnOnce(&mut Controller<'_>, &mut EditorSession) -> Result<R, CoreError>,
) -> AppResult<R> {
    state
        .sessions
        .with_session(id, |session| with_controller(state, origin, session, action))
        .ok_or(AppError::SessionNotFound(id))?
        .map_err(AppError::from)
}

fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// POST /identity/sessions
// ---------------------------------------------------------------------------

/// Start an editing session seeded from the persisted profile.
pub async fn start_session(
    State(state): State<AppState>,
    origin: RequestOrigin,
) -> AppResult<impl IntoResponse> {
    let mut session = EditorSession::new();
    let record = with_controller(&state, &origin, &mut session, |controller, session| {
        controller.load(session)
    })?;

    let form = ProfileForm::build(&session, &record, Vec::new());
    let phase = session.phase();
    let session_id = state.sessions.insert(session);

    tracing::info!(%session_id, rows = form.row_count, "Identity editing session started");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartedSession {
                view: SessionView {
                    session_id,
                    phase,
                    form,
                },
                record,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /identity/sessions/{id}
// ---------------------------------------------------------------------------

/// Re-render the form for an open session. The row count is kept.
pub async fn get_session(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = in_session(&state, &origin, id, |controller, session| {
        let record = controller.load(session)?;
        Ok(SessionView {
            session_id: id,
            phase: session.phase(),
            form: ProfileForm::build(session, &record, Vec::new()),
        })
    })?;

    tracing::debug!(session_id = %id, rows = view.form.row_count, "Identity form re-rendered");

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /identity/sessions/{id}/rows
// ---------------------------------------------------------------------------

/// "Add another link": one more slot, keeping everything typed so far.
///
/// The body is the current draft. Nothing is validated or saved.
pub async fn add_row(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<Uuid>,
    Json(draft): Json<ProfileRecord>,
) -> AppResult<impl IntoResponse> {
    let view = in_session(&state, &origin, id, |controller, session| {
        controller.add_row_requested(session)?;
        Ok(SessionView {
            session_id: id,
            phase: session.phase(),
            form: ProfileForm::build(session, &draft, Vec::new()),
        })
    })?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PUT /identity/sessions/{id}
// ---------------------------------------------------------------------------

/// Validate and save the submitted profile.
///
/// Returns the operator messages on success, or `422` with one entry per
/// failing field. A completed session is closed.
pub async fn submit(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<Uuid>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<Json<DataResponse<Ack>>> {
    let SubmitRequest {
        record,
        avatar_upload,
    } = input;

    let ack = in_session(&state, &origin, id, |controller, session| {
        controller.submit(session, record, avatar_upload)
    })?;

    tracing::info!(session_id = %id, "Identity profile submitted");

    Ok(Json(DataResponse { data: ack }))
}

// ---------------------------------------------------------------------------
// POST /identity/avatar
// ---------------------------------------------------------------------------

/// Accepts a multipart form with a required `file` field and stores it as a
/// temporary asset. It becomes permanent once a profile referencing it is
/// saved.
pub async fn upload_avatar(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedAvatar>>)> {
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((file_name, data.to_vec()));
    }

    let (file_name, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let ext = extension_of(&file_name).unwrap_or_default();
    if !AVATAR_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            AVATAR_EXTENSIONS.join(", ")
        )));
    }

    let uploaded = {
        let mut files = lock(&state.files);
        let asset = files.upload(&file_name, &data)?;
        let url = files.resolve_absolute_url(&asset);
        UploadedAvatar { asset, url }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: uploaded })))
}

// ---------------------------------------------------------------------------
// GET /identity/hcard
// ---------------------------------------------------------------------------

/// Props for the h-card component, plus the cache tags they depend on.
pub async fn render_hcard(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Query(query): Query<HCardQuery>,
) -> AppResult<impl IntoResponse> {
    let block = BlockConfig {
        force_visible: query.force_visible,
    };

    let props = {
        let settings = lock(&state.settings);
        let files = lock(&state.files);
        RenderAdapter::new(&*settings, &*files, &origin).build(&block)?
    };

    Ok(Json(DataResponse {
        data: RenderedHCard {
            props,
            cache_tags: cache_tags(),
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /identity/help
// ---------------------------------------------------------------------------

pub async fn help() -> Json<DataResponse<HelpResponse>> {
    Json(DataResponse {
        data: HelpResponse {
            intro: SETTINGS_INTRO,
            page: help_page(SETTINGS_PATH, HCARD_PATH),
        },
    })
}
