//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Only a fixed message per error kind reaches the client; underlying
//! database and upstream details are logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

use crate::db::repos::DbError;
use crate::github::GithubError;
use crate::models::ValidationError;

const INTERNAL_MESSAGE: &str = "an internal error occurred";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(Vec<ValidationError>),

    /// Post, user or repository not found (404)
    NotFound { message: String },

    /// Upstream refused the request (403)
    Forbidden { reason: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

/// Error response body
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: &'static str,
    pub message: ErrorMessage,
}

/// One message, or one per failed validation
#[derive(Debug, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match self {
            Self::Validation(errors) => (
                "validation_error",
                ErrorMessage::Many(errors.iter().map(ToString::to_string).collect()),
            ),
            Self::NotFound { message } => ("not_found", ErrorMessage::One(message)),
            Self::Forbidden { reason } => ("forbidden", ErrorMessage::One(reason)),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ("internal_error", ErrorMessage::One(INTERNAL_MESSAGE.into()))
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ("internal_error", ErrorMessage::One(INTERNAL_MESSAGE.into()))
            }
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(vec![e])
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound {
                message: format!("{} '{}' not found", resource, id),
            },
            _ => Self::Database(e),
        }
    }
}

impl From<GithubError> for ApiError {
    fn from(e: GithubError) -> Self {
        match e {
            GithubError::MissingUsername => Self::Validation(vec![ValidationError::Required {
                field: "username",
                hint: "pass a GitHub username or set GITHUB_USERNAME",
            }]),
            GithubError::UserNotFound { .. } => Self::NotFound {
                message: "GitHub user does not exist or repositories are inaccessible".into(),
            },
            GithubError::RepoNotFound { .. } => Self::NotFound {
                message: "repository not found: it does not exist or is inaccessible".into(),
            },
            GithubError::RateLimited => Self::Forbidden {
                reason: "GitHub API rate limit reached; retry later or configure GITHUB_TOKEN"
                    .into(),
            },
            other => Self::Internal {
                message: format!("failed to fetch GitHub repository information: {}", other),
            },
        }
    }
}
