//! Site origin for the current request.
//!
//! A configured `SITE_ORIGIN` wins. Otherwise the origin is rebuilt from the
//! `Host` header and, behind a proxy, `X-Forwarded-Proto`.

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use identity_core::ports::OriginProvider;

use crate::error::AppError;
use crate::state::AppState;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

impl RequestOrigin {
    /// Derive the origin from request headers, defaulting to plain `http`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())?;

        let scheme = headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v == "http" || v == "https")
            .unwrap_or_else(|| "http".to_string());

        Some(Self(format!("{scheme}://{host}")))
    }
}

impl OriginProvider for RequestOrigin {
    fn site_origin(&self) -> String {
        self.0.clone()
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(origin) = &state.config.site_origin {
            return Ok(Self(origin.clone()));
        }
        Self::from_headers(&parts.headers)
            .ok_or_else(|| AppError::BadRequest("Missing Host header".into()))
    }
}
