//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use blogapi_server::AppConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides DATABASE_URL and DATABASE_WRITE_URL)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
        config.database.write_url = None;
    }

    blogapi_server::migrate(&config.database)
        .await
        .context("Migration failed")?;

    tracing::info!("Schema is up to date");
    Ok(())
}
