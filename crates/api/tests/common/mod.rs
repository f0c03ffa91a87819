#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use identity_api::config::ServerConfig;
use identity_api::router::build_app_router;
use identity_api::state::AppState;
use identity_core::feedback::DEFAULT_VALIDATOR_BASE;
use identity_store::{JsonFileSettingsStore, LocalFileStore};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SITE_ORIGIN: &str = "https://ada.example";
pub const FILES_URL: &str = "https://ada.example/files";

/// A router over fresh stores in a temporary directory.
///
/// Keep the struct alive for the duration of the test; dropping it removes
/// the directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` rooted in `dir`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a fixed site origin.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        site_origin: Some(SITE_ORIGIN.to_string()),
        settings_path: dir.path().join("indieweb_identity.settings.json"),
        upload_dir: dir.path().join("files"),
        public_files_url: FILES_URL.to_string(),
        validator_base_url: DEFAULT_VALIDATOR_BASE.to_string(),
        temporary_file_max_age_secs: 21600,
        session_ttl_secs: 3600,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], with a chance to adjust the config first.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    adjust(&mut config);

    let settings = JsonFileSettingsStore::open(&config.settings_path).unwrap();
    let files = LocalFileStore::open(&config.upload_dir, config.public_files_url.clone()).unwrap();
    let state = AppState::new(config.clone(), settings, files);
    let router = build_app_router(state.clone(), &config);

    TestApp { router, state, dir }
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("host", "ada.example")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("host", "ada.example")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_request(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "ada.example")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body).await
}

/// POST a single-file multipart form with the given field name.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "identity-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("host", "ada.example")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
