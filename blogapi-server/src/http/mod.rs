//! HTTP server layer
//!
//! Axum server with:
//! - Mirrored-origin CORS with credentials
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses
//! - OpenAPI document and Swagger UI at /api

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, CorsPolicy, ServerConfig, ServerError};
