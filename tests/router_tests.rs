// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router-wide behaviour: CORS, preflight and health.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_app, json_request, send};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_preflight_returns_204() {
    let app = create_test_app();

    for uri in [
        "/api/v1/cognito/auth",
        "/api/v1/file",
        "/api/v1/file/upload",
        "/api/v1/discord/oauth",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(uri)
                    .header("Origin", "https://hearthhub.example")
                    .header("Access-Control-Request-Method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", uri);
        let headers = response.headers();
        assert_eq!(headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(headers["Access-Control-Allow-Credentials"], "true");
        assert_eq!(
            headers["Access-Control-Allow-Methods"],
            "POST, OPTIONS, GET, PUT, DELETE"
        );
    }
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/cognito/auth",
            json!({"discordId": "1", "refreshToken": "nope"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_404() {
    let app = create_test_app();
    let request = Request::builder()
        .uri("/api/v1/nope")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
