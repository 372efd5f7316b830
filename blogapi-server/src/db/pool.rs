//! Database connection pools
//!
//! Two independent sqlx pools: a write pool pointed at the primary and a read
//! pool that may point at a replica. Repositories pick the pool matching the
//! operation so read traffic can move to a replica by configuration alone.

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::config::{ConfigError, DatabaseConfig};

/// Which pool an operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Read,
    Write,
}

/// Error while establishing the pools
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect {pool} pool: {source}")]
    Connect {
        pool: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Write-primary / read-replica pool pair
#[derive(Debug, Clone)]
pub struct Database {
    write: PgPool,
    read: PgPool,
}

impl Database {
    /// Connect both pools.
    ///
    /// Fails if either pool cannot be established; callers should treat this
    /// as fatal rather than serve with one pool missing.
    ///
    /// With `log_queries` set, every statement is logged at debug level.
    /// Otherwise statements are not logged and slow ones surface as warnings.
    pub async fn connect(config: &DatabaseConfig, log_queries: bool) -> Result<Self, ConnectError> {
        let write_url = config.resolved_write_url()?;
        let read_url = config.resolved_read_url()?;

        let write = open_pool("write", write_url, config.max_connections, log_queries).await?;
        let read = match open_pool("read", read_url, config.max_connections, log_queries).await {
            Ok(pool) => pool,
            Err(e) => {
                write.close().await;
                return Err(e);
            }
        };

        tracing::info!(
            split = write_url != read_url,
            max_connections = config.max_connections,
            "database pools connected"
        );

        Ok(Self { write, read })
    }

    /// Wrap existing pools.
    pub fn from_pools(write: PgPool, read: PgPool) -> Self {
        Self { write, read }
    }

    /// Pool for mutating statements.
    pub fn write(&self) -> &PgPool {
        &self.write
    }

    /// Pool for queries.
    pub fn read(&self) -> &PgPool {
        &self.read
    }

    /// Pool for the given access kind.
    pub fn client(&self, access: Access) -> &PgPool {
        match access {
            Access::Read => &self.read,
            Access::Write => &self.write,
        }
    }

    /// Close both pools. Safe to call more than once.
    pub async fn close(&self) {
        self.write.close().await;
        self.read.close().await;
        tracing::info!("database pools closed");
    }
}

async fn open_pool(
    pool: &'static str,
    url: &str,
    max_connections: u32,
    log_queries: bool,
) -> Result<PgPool, ConnectError> {
    let level = if log_queries {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    };

    let options = url
        .parse::<PgConnectOptions>()
        .map_err(|source| ConnectError::Connect { pool, source })?
        .log_statements(level);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|source| ConnectError::Connect { pool, source })
}
