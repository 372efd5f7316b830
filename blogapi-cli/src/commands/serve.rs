//! HTTP server command
//!
//! Resolves configuration from `.env`, the environment and flags (flags win),
//! then runs the API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use blogapi_server::{AppConfig, CorsPolicy};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to (default: 0.0.0.0)
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (default: 3000)
    #[arg(long, short = 'p', env = "PORT")]
    pub port: Option<u16>,

    /// Database URL for both pools (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Allow permissive CORS (all origins, no credentials) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Do not create missing tables on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeArgs {
    /// Layer the flags over an environment-derived config.
    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        let host = match &self.host {
            Some(host) => host.clone(),
            None => config.server.bind_addr.ip().to_string(),
        };
        let port = self.port.unwrap_or(config.server.bind_addr.port());
        config.server.bind_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        if self.cors_permissive {
            config.server.cors = CorsPolicy::Permissive;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        Ok(())
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    args.apply(&mut config)?;

    tracing::info!(
        environment = %config.environment,
        migrations = !args.skip_migrations,
        "Starting blogapi server on {}",
        config.server.bind_addr
    );

    // Blocks until shutdown
    blogapi_server::serve(config, !args.skip_migrations)
        .await
        .context("Server error")?;

    Ok(())
}
