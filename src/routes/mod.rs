// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod cognito;
pub mod discord;
pub mod file;

use crate::error::AppError;
use crate::middleware::{add_cors_headers, log_request};
use crate::AppState;
use axum::extract::{rejection::JsonRejection, Request};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;
use validator::{Validate, ValidationErrors};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Unwrap a JSON body and run its validation rules. Both malformed JSON
/// and failed validation are 400s.
pub(crate) fn validated<T: Validate>(
    body: std::result::Result<Json<T>, JsonRejection>,
) -> crate::error::Result<T> {
    let Json(value) = body.map_err(|e| {
        tracing::warn!(error = %e.body_text(), "Could not parse request body");
        AppError::Validation(format!("invalid request body: {}", e.body_text()))
    })?;

    value
        .validate()
        .map_err(|e| AppError::Validation(first_message(&e)))?;

    Ok(value)
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Span for one request. Records the path only: file routes carry
/// refresh tokens in the query string.
fn request_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .merge(discord::routes())
        .merge(cognito::routes())
        .merge(file::routes())
        .layer(middleware::from_fn(add_cors_headers));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(middleware::from_fn(log_request))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Viking {
        #[serde(default)]
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    #[test]
    fn test_validated_passes_good_body() {
        let viking = validated(Ok(Json(Viking {
            name: "bjorn".to_string(),
        })))
        .unwrap();
        assert_eq!(viking.name, "bjorn");
    }

    #[test]
    fn test_validated_reports_rule_message() {
        let err = validated(Ok(Json(Viking {
            name: String::new(),
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "name is required");
    }
}
