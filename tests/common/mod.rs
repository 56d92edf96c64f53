// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use hearthhub_api::config::Config;
use hearthhub_api::models::FilePolicy;
use hearthhub_api::routes::create_router;
use hearthhub_api::services::{
    DiscordService, IdentityService, MemoryIdentityPool, MemoryObjectStore, StorageService,
};
use hearthhub_api::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

/// Nothing listens on the discard port, so exchanges fail fast.
#[allow(dead_code)]
pub const UNREACHABLE_TOKEN_URL: &str = "http://127.0.0.1:9/api/oauth2/token";

/// Router plus handles on the in-memory backends behind it.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub pool: Arc<MemoryIdentityPool>,
    pub store: Arc<MemoryObjectStore>,
}

/// Create a test app with offline in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_token_url(UNREACHABLE_TOKEN_URL)
}

/// Create a test app whose Discord client talks to `token_url`.
#[allow(dead_code)]
pub fn create_test_app_with_token_url(token_url: &str) -> TestApp {
    let config = Config::test_default();

    let pool = Arc::new(MemoryIdentityPool::new(
        &config.cognito_client_id,
        &config.cognito_client_secret,
    ));
    let identity = IdentityService::new(
        pool.clone(),
        config.cognito_client_id.clone(),
        config.cognito_client_secret.clone(),
    );

    let store = Arc::new(MemoryObjectStore::new());
    let storage = StorageService::new(store.clone());

    let discord = DiscordService::new(
        reqwest::Client::new(),
        config.discord_client_id.clone(),
        config.discord_client_secret.clone(),
        config.discord_redirect_uri.clone(),
    )
    .with_token_url(token_url);

    let state = Arc::new(AppState {
        config,
        policy: FilePolicy::default(),
        identity,
        discord,
        storage,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        pool,
        store,
    }
}

/// Send a request and return the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A multipart upload with a single `file` field.
#[allow(dead_code)]
pub fn multipart_request(uri: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "hearthhub-test-boundary";
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Register a user through the API and return the response body.
#[allow(dead_code)]
pub async fn register(app: &TestApp, discord_id: &str) -> Value {
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/cognito/create-user",
            serde_json::json!({
                "discord_id": discord_id,
                "discord_username": format!("viking{}", discord_id),
                "discord_email": format!("viking{}@example.com", discord_id),
                "avatar_id": "a1b2c3",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    body
}

/// Register a user and return their refresh token.
#[allow(dead_code)]
pub async fn refresh_token_for(app: &TestApp, discord_id: &str) -> String {
    register(app, discord_id).await["credentials"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string()
}
