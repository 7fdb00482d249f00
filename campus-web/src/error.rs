//! Error types for campus-web
//!
//! Every variant renders as the shared JSON envelope
//! `{success: false, message, error?}` with a matching HTTP status.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_common::ApiEnvelope;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing identity or wrong shared secret (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// External bibliographic service failed (502)
    #[error("Upstream error: {message}: {error}")]
    Upstream { message: String, error: String },

    /// Internal server error (500) with a user-facing message and the cause
    #[error("{message}: {error}")]
    Internal { message: String, error: String },

    /// Database error without handler-specific context
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// campus-common error
    #[error("Common error: {0}")]
    Common(#[from] campus_common::Error),
}

impl ApiError {
    /// 500 with a user-facing message, keeping the cause in `error`
    pub fn internal(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            message: message.into(),
            error: error.to_string(),
        }
    }

    /// 502 with a user-facing message, keeping the cause in `error`
    pub fn upstream(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        ApiError::Upstream {
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Common(campus_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(campus_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } | ApiError::Database(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, error) = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => (msg, None),
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
            ApiError::Upstream { message, error } | ApiError::Internal { message, error } => {
                (message, Some(error))
            }
            ApiError::Database(err) => ("Database error".to_string(), Some(err.to_string())),
            ApiError::Common(campus_common::Error::NotFound(msg))
            | ApiError::Common(campus_common::Error::InvalidInput(msg)) => (msg, None),
            ApiError::Common(err) => ("Internal error".to_string(), Some(err.to_string())),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, message = %message, error = ?error, "Request failed");
        }

        (status, Json(ApiEnvelope::<()>::failure(message, error))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
