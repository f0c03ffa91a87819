use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use identity_store::{JsonFileSettingsStore, LocalFileStore};

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
///
/// Lock order is sessions, then settings, then files. No guard is held
/// across an `.await`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The persisted identity settings.
    pub settings: Arc<Mutex<JsonFileSettingsStore>>,
    /// Uploaded files (avatars).
    pub files: Arc<Mutex<LocalFileStore>>,
    /// Open editing sessions.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        settings: JsonFileSettingsStore,
        files: LocalFileStore,
    ) -> Self {
        let sessions = SessionRegistry::new(config.session_ttl());
        Self {
            config: Arc::new(config),
            settings: Arc::new(Mutex::new(settings)),
            files: Arc::new(Mutex::new(files)),
            sessions: Arc::new(sessions),
        }
    }
}

/// Lock a store, recovering the guard if a previous holder panicked.
///
/// The stores only change through whole-value writes, so a poisoned lock
/// still guards consistent data.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
