use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use identity_api::config::ServerConfig;
use identity_api::router::build_app_router;
use identity_api::state::AppState;
use identity_store::{JsonFileSettingsStore, LocalFileStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Stores ---
    let settings = JsonFileSettingsStore::open(&config.settings_path)
        .expect("Failed to open settings store");
    tracing::info!(path = %config.settings_path.display(), "Settings store opened");

    let mut files = LocalFileStore::open(&config.upload_dir, config.public_files_url.clone())
        .expect("Failed to open file store");
    tracing::info!(
        root = %config.upload_dir.display(),
        public_url = %config.public_files_url,
        "File store opened"
    );

    // Uploads abandoned before a successful save are not kept across restarts.
    match files.purge_temporary(config.temporary_file_max_age(), chrono::Utc::now()) {
        Ok(removed) => tracing::info!(count = removed.len(), "Temporary upload purge finished"),
        Err(e) => tracing::warn!(error = %e, "Temporary upload purge failed"),
    }

    // --- App state & router ---
    let state = AppState::new(config.clone(), settings, files);
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
