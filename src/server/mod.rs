//! HTTP Surface
//!
//! Routes:
//! - `GET /` control page
//! - `POST /upload` store an uploaded file
//! - `POST /process` apply gains to a stored upload
//! - `GET /uploads/*` and `GET /processed/*` read-only file serving
//!
//! Each request runs on its own task; handlers share nothing mutable.

pub mod handlers;
pub mod page;
pub mod storage;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{EqualizerError, Result};

pub use storage::{processed_name, sanitize_filename, FileStore, StoredFile};

/// Shared, read-only state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub uploads: FileStore,
    pub processed: FileStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let uploads = FileStore::new(&config.upload_dir);
        let processed = FileStore::new(&config.processed_dir);
        Self {
            config: Arc::new(config),
            uploads,
            processed,
        }
    }

    /// Create both store directories
    pub fn ensure_dirs(&self) -> Result<()> {
        self.uploads.ensure_dir()?;
        self.processed.ensure_dir()?;
        Ok(())
    }
}

impl IntoResponse for EqualizerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("[{}] {}", self.error_code(), self);
        } else {
            warn!("[{}] {}", self.error_code(), self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Build the router for the given state
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/upload",
            post(handlers::upload)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/process",
            post(handlers::process).fallback(handlers::method_not_allowed),
        )
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .nest_service("/processed", ServeDir::new(state.processed.root()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the store directories and serve until interrupted
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate()?;

    let state = AppState::new(config);
    state.ensure_dirs()?;

    let listener = TcpListener::bind(state.config.socket_addr()).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    info!(
        "Uploads in {}, processed files in {}, upload limit {} bytes",
        state.uploads.root().display(),
        state.processed.root().display(),
        state.config.max_upload_bytes
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
