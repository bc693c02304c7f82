// src/api/error.rs
// Unified error handling for HTTP handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// API error type that converts to proper HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - client sent invalid data
    BadRequest(String),
    /// 401 Unauthorized - missing or invalid credentials
    Unauthorized(String),
    /// 404 Not Found - resource doesn't exist
    NotFound(String),
    /// 500 Internal Server Error - something went wrong on our end
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.message(),
        }));

        // Log server errors, but not client errors
        if status.is_server_error() {
            tracing::error!("API error: {}", self.message());
        }

        (status, body).into_response()
    }
}

/// Convenience type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait to convert anyhow errors to API errors
pub trait IntoApiError<T> {
    fn api_error(self, context: &str) -> ApiResult<T>;
}

impl<T> IntoApiError<T> for anyhow::Result<T> {
    fn api_error(self, context: &str) -> ApiResult<T> {
        self.map_err(|e| ApiError::internal(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option types
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, resource: &str) -> ApiResult<T>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, resource: &str) -> ApiResult<T> {
        self.ok_or_else(|| ApiError::not_found(format!("{} not found", resource)))
    }
}
