//! Liveness and health endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

/// GET / response
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LivenessResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub environment: String,
}

/// GET /health response
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub timestamp: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /
async fn liveness(State(state): State<Arc<AppState>>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".into(),
        message: "Blog API is running".into(),
        timestamp: now(),
        environment: state.environment.clone(),
    })
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: now(),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use crate::http::server::testing::{app, expect};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn liveness_reports_environment() {
        let body = expect(&app(), "GET", "/", None, StatusCode::OK).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "test");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn health_reports_uptime() {
        let body = expect(&app(), "GET", "/health", None, StatusCode::OK).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    }
}
