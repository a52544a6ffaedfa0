//! Error types for the blog service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::{AuthError, TokenError};

// == Config Error ==
/// Startup problems. Fatal, never surfaced per request.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// Variable is set but unusable
    #[error("invalid configuration for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// Metric families could not be registered
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

// == App Error ==
/// Unified per-request error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Entity not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid request data
    #[error("{0}")]
    InvalidRequest(String),

    /// Several validation failures at once
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// Entity already exists
    #[error("{0}")]
    Conflict(String),

    /// Authenticated, but not allowed to touch this entity
    #[error("{0}")]
    Forbidden(String),

    /// Credentials rejected
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token missing, invalid or revoked
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) | AppError::Validation(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(message) => AppError::Internal(message),
            other => AppError::Unauthorized(AuthError::Token(other)),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let error = match &self {
            AppError::Validation(messages) if messages.len() > 1 => json!({
                "code": status.as_u16(),
                "messages": messages,
            }),
            _ => json!({
                "code": status.as_u16(),
                "message": self.to_string(),
            }),
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the blog service.
pub type Result<T> = std::result::Result<T, AppError>;
