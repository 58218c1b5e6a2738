//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Cover images served from the upload directory
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::TokenManager;
use crate::cache::CacheStore;
use crate::queue::ExportPublisher;
use crate::services::{LikeService, PlaylistAccess};
use crate::storage::CoverStorage;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors_permissive: false,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub cache: Arc<dyn CacheStore>,
    pub publisher: Arc<dyn ExportPublisher>,
    pub tokens: TokenManager,
    pub storage: CoverStorage,
    /// Prefix for cover URLs, without trailing slash
    pub public_base_url: String,
    pub cache_expiry: Duration,
}

impl AppState {
    pub fn likes(&self) -> LikeService<'_> {
        LikeService::new(&self.pool, self.cache.as_ref(), self.cache_expiry)
    }

    pub fn access(&self) -> PlaylistAccess<'_> {
        PlaylistAccess::new(&self.pool, self.cache.as_ref(), self.cache_expiry)
    }

    /// Public URL of a stored cover file.
    pub fn cover_url(&self, file_name: &str) -> String {
        format!(
            "{}/upload/images/{}",
            self.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}

/// Assemble every route, static cover serving and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:5000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:5000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let covers = ServeDir::new(state.storage.dir());

    Router::new()
        .merge(routes::health::router())
        .merge(routes::albums::router())
        .merge(routes::uploads::router())
        .merge(routes::likes::router())
        .merge(routes::songs::router())
        .merge(routes::users::router())
        .merge(routes::authentications::router())
        .merge(routes::playlists::router())
        .merge(routes::collaborations::router())
        .merge(routes::exports::router())
        .nest_service("/upload/images", covers)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let state = AppState { pool, cache, publisher, tokens, storage, public_base_url, cache_expiry };
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(
        upload_dir = %state.storage.dir().display(),
        public_base_url = %state.public_base_url,
        "Serving covers"
    );
    let app = build_router(Arc::new(state), &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
