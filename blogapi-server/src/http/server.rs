//! Axum server setup
//!
//! Server skeleton with:
//! - CORS mirroring the caller's origin, credentials allowed
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::github::RepositoryService;
use crate::posts::PostService;

/// CORS policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorsPolicy {
    /// Reflect the request origin and allow credentials
    #[default]
    MirrorOrigin,
    /// Any origin, no credentials
    Permissive,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], crate::config::DEFAULT_PORT)),
            cors: CorsPolicy::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub posts: PostService,
    pub repositories: RepositoryService,
    /// Deployment environment reported by `GET /`
    pub environment: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(posts: PostService, repositories: RepositoryService, environment: String) -> Self {
        Self {
            posts,
            repositories,
            environment,
            started_at: Instant::now(),
        }
    }
}

fn cors_layer(policy: CorsPolicy) -> CorsLayer {
    match policy {
        CorsPolicy::MirrorOrigin => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
        CorsPolicy::Permissive => {
            tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
            CorsLayer::permissive()
        }
    }
}

/// Build the application router with all routes.
pub fn build_router(state: AppState, cors: CorsPolicy) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::posts::router())
        .merge(routes::github::router())
        .merge(routes::docs::router())
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, config.cors);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    tracing::info!("API docs at http://{}/api", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
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
