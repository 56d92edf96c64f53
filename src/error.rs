// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every failure the API can surface falls into one of four kinds, each
/// with a fixed status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    Validation(String),

    /// Bad refresh token or identifier mismatch (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown user or object (404).
    #[error("{0}")]
    NotFound(String),

    /// Any identity provider, object store or OAuth endpoint failure (500).
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap an upstream failure, keeping the operation that failed in the message.
    pub fn upstream(operation: &str, cause: impl std::fmt::Display) -> Self {
        AppError::Upstream(format!("{}: {}", operation, cause))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Upstream(msg) = &self {
            tracing::error!(error = %msg, "Upstream failure");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_keeps_cause() {
        let err = AppError::upstream("failed to list objects", "access denied");
        assert_eq!(err.to_string(), "failed to list objects: access denied");
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let response = AppError::NotFound("user with id: 42 does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "user with id: 42 does not exist");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
