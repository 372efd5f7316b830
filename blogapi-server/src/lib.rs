//! blogapi-server: HTTP API for blog posts and GitHub repository metadata
//!
//! Posts (with shared tags) live in PostgreSQL behind a write/read pool pair.
//! Repository metadata is fetched from the GitHub REST API on every request
//! and never stored.

pub mod config;
pub mod db;
pub mod github;
pub mod http;
pub mod models;
pub mod posts;

use std::sync::Arc;

pub use config::{AppConfig, ConfigError, DatabaseConfig, GithubConfig};
pub use db::{ConnectError, Database};
pub use http::{build_router, run_server, AppState, CorsPolicy, ServerConfig, ServerError};

use db::{migrations, PostRepo};
use github::{GithubClient, GithubError, RepositoryService};
use posts::PostService;

/// Error while bringing the service up or running it
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("schema bootstrap failed: {0}")]
    Migrate(#[source] sqlx::Error),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Connect, optionally bootstrap the schema, and serve until shutdown.
///
/// Both pools are closed once the server has drained, including when the
/// server itself fails.
pub async fn serve(config: AppConfig, run_migrations: bool) -> Result<(), ServeError> {
    let db = Database::connect(&config.database, config.is_development()).await?;

    let result = serve_with(&db, config, run_migrations).await;
    db.close().await;
    result
}

async fn serve_with(db: &Database, config: AppConfig, run_migrations: bool) -> Result<(), ServeError> {
    if run_migrations {
        migrations::run(db.write()).await.map_err(ServeError::Migrate)?;
    }

    let posts = PostService::new(Arc::new(PostRepo::new(db.clone())));
    let client = GithubClient::new(&config.github)?;
    let repositories = RepositoryService::new(Arc::new(client), config.github.default_username.clone());

    let state = AppState::new(posts, repositories, config.environment.clone());
    run_server(state, config.server).await?;
    Ok(())
}

/// Apply the schema bootstrap against the write database and exit.
pub async fn migrate(config: &DatabaseConfig) -> Result<(), ServeError> {
    let db = Database::connect(config, false).await?;
    let result = migrations::run(db.write()).await.map_err(ServeError::Migrate);
    db.close().await;
    result
}
