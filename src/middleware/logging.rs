// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request access log line.

use axum::{extract::Request, http::header, middleware::Next, response::Response};

/// Log method, path and user agent, then the resulting status.
///
/// The query string is left out: it carries refresh tokens.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    tracing::info!(method = %method, path = %path, user_agent = %user_agent, "Request received");

    let response = next.run(req).await;

    if response.status().is_server_error() {
        tracing::warn!(method = %method, path = %path, status = response.status().as_u16(), "Request failed");
    } else {
        tracing::debug!(method = %method, path = %path, status = response.status().as_u16(), "Request complete");
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_log_request_passes_through() {
        let app = Router::new()
            .route("/", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .layer(axum::middleware::from_fn(log_request));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?refreshToken=secret")
                    .header("User-Agent", "test-agent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
