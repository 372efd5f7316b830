//! blogapi CLI - blog posts API with a GitHub repository proxy
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply the schema bootstrap and exit
//! - `config`: print the resolved configuration, secrets redacted

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::{ConfigArgs, MigrateArgs, ServeArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "blogapi",
    author,
    version,
    about = "Blog posts API with read/write database split and a GitHub repository proxy"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create the database schema and exit
    Migrate(MigrateArgs),
    /// Print the resolved configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Config(args) => commands::run_config(args)?,
    }
    Ok(())
}
