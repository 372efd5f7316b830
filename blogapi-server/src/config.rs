//! Process configuration
//!
//! Everything the server reads from the environment is collected here once,
//! at startup, and handed to the constructors that need it. Nothing else in
//! the crate calls `std::env`.

use std::net::SocketAddr;

use serde::Serialize;

use crate::http::server::{CorsPolicy, ServerConfig};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default GitHub REST API base URL
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment name used when `APP_ENV` is unset
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default maximum connections per pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("no database URL for the {pool} pool: set DATABASE_URL or {var}")]
    MissingDatabaseUrl {
        pool: &'static str,
        var: &'static str,
    },
}

/// Database connection settings for the write/read pool pair
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseConfig {
    /// `DATABASE_URL`, used by either pool when it has no override
    pub url: Option<String>,
    /// `DATABASE_WRITE_URL`
    pub write_url: Option<String>,
    /// `DATABASE_READ_URL`
    pub read_url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Build from a single URL used by both pools.
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            ..Self::default()
        }
    }

    /// URL for the write (primary) pool.
    pub fn resolved_write_url(&self) -> Result<&str, ConfigError> {
        self.write_url
            .as_deref()
            .or(self.url.as_deref())
            .ok_or(ConfigError::MissingDatabaseUrl {
                pool: "write",
                var: "DATABASE_WRITE_URL",
            })
    }

    /// URL for the read (replica) pool.
    pub fn resolved_read_url(&self) -> Result<&str, ConfigError> {
        self.read_url
            .as_deref()
            .or(self.url.as_deref())
            .ok_or(ConfigError::MissingDatabaseUrl {
                pool: "read",
                var: "DATABASE_READ_URL",
            })
    }
}

/// GitHub API settings
#[derive(Debug, Clone, Serialize)]
pub struct GithubConfig {
    pub api_url: String,
    /// Used when a request names no user
    pub default_username: Option<String>,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            default_username: None,
            token: None,
        }
    }
}

/// Whole-process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    /// Deployment environment name (`APP_ENV`)
    pub environment: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let bind_addr: SocketAddr =
            format!("{}:{}", host, port)
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    var: "HOST",
                    reason: e.to_string(),
                })?;

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            server: ServerConfig {
                bind_addr,
                cors: CorsPolicy::default(),
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                write_url: get("DATABASE_WRITE_URL"),
                read_url: get("DATABASE_READ_URL"),
                max_connections,
            },
            github: GithubConfig {
                api_url: get("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                default_username: get("GITHUB_USERNAME"),
                token: get("GITHUB_TOKEN"),
            },
            environment: get("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        })
    }

    /// True when running in the development environment.
    pub fn is_development(&self) -> bool {
        self.environment == DEFAULT_ENVIRONMENT
    }
}
