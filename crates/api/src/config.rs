use std::path::PathBuf;

use chrono::TimeDelta;
use identity_core::feedback::DEFAULT_VALIDATOR_BASE;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Fixed public origin of the site. When unset the origin is derived
    /// from each request's `Host` / `X-Forwarded-Proto` headers.
    pub site_origin: Option<String>,
    /// JSON document holding the profile settings.
    pub settings_path: PathBuf,
    /// Root directory of uploaded files.
    pub upload_dir: PathBuf,
    /// Public URL the upload directory is served from.
    pub public_files_url: String,
    /// Base URL of the external h-card validator.
    pub validator_base_url: String,
    /// Age after which unused temporary uploads are purged at start-up.
    pub temporary_file_max_age_secs: u64,
    /// Idle time after which an abandoned editing session is evicted.
    pub session_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                   |
    /// |-------------------------------|-------------------------------------------|
    /// | `HOST`                        | `0.0.0.0`                                 |
    /// | `PORT`                        | `3000`                                    |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`                   |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                                      |
    /// | `SITE_ORIGIN`                 | unset                                     |
    /// | `SETTINGS_PATH`               | `data/indieweb_identity.settings.json`    |
    /// | `UPLOAD_DIR`                  | `data/files`                              |
    /// | `PUBLIC_FILES_URL`            | `http://localhost:<PORT>/files`           |
    /// | `HCARD_VALIDATOR_URL`         | `https://indiewebify.me/validate-h-card/` |
    /// | `TEMPORARY_FILE_MAX_AGE_SECS` | `21600`                                   |
    /// | `SESSION_TTL_SECS`            | `3600`                                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let site_origin = std::env::var("SITE_ORIGIN")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let settings_path = std::env::var("SETTINGS_PATH")
            .unwrap_or_else(|_| "data/indieweb_identity.settings.json".into())
            .into();

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "data/files".into())
            .into();

        let public_files_url = std::env::var("PUBLIC_FILES_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/files"));

        let validator_base_url = std::env::var("HCARD_VALIDATOR_URL")
            .unwrap_or_else(|_| DEFAULT_VALIDATOR_BASE.into());

        let temporary_file_max_age_secs: u64 = std::env::var("TEMPORARY_FILE_MAX_AGE_SECS")
            .unwrap_or_else(|_| "21600".into())
            .parse()
            .expect("TEMPORARY_FILE_MAX_AGE_SECS must be a valid u64");

        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_TTL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            site_origin,
            settings_path,
            upload_dir,
            public_files_url,
            validator_base_url,
            temporary_file_max_age_secs,
            session_ttl_secs,
        }
    }

    pub fn temporary_file_max_age(&self) -> TimeDelta {
        saturating_seconds(self.temporary_file_max_age_secs)
    }

    pub fn session_ttl(&self) -> TimeDelta {
        saturating_seconds(self.session_ttl_secs)
    }
}

/// Seconds as a [`TimeDelta`], clamped to the largest representable span.
fn saturating_seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
