// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HearthHub API Server
//!
//! Runs as an AWS Lambda function behind API Gateway, or as a plain HTTP
//! server for local development.

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use hearthhub_api::{
    config::Config,
    models::FilePolicy,
    services::{
        CognitoPool, DiscordService, IdentityService, S3ObjectStore, StorageService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let on_lambda = std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

    // Load configuration from environment
    let config = Config::from_env().context("failed to load configuration")?;
    init_logging(&config.log_level, on_lambda);
    tracing::info!(config = ?config, on_lambda, "Starting HearthHub API");

    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;

    let pool = CognitoPool::new(
        aws_sdk_cognitoidentityprovider::Client::new(&aws),
        config.user_pool_id.clone(),
        config.cognito_client_id.clone(),
    );
    let identity = IdentityService::new(
        Arc::new(pool),
        config.cognito_client_id.clone(),
        config.cognito_client_secret.clone(),
    );
    tracing::info!(user_pool_id = %config.user_pool_id, "User pool client initialized");

    let store = S3ObjectStore::new(aws_sdk_s3::Client::new(&aws), config.bucket.clone());
    let storage = StorageService::new(Arc::new(store));
    tracing::info!(bucket = %config.bucket, "Object store client initialized");

    let http = reqwest::Client::builder()
        .user_agent(concat!("hearthhub-api/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let discord = DiscordService::new(
        http,
        config.discord_client_id.clone(),
        config.discord_client_secret.clone(),
        config.discord_redirect_uri.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        policy: FilePolicy::default(),
        identity,
        discord,
        storage,
    });

    // Build router
    let app = hearthhub_api::routes::create_router(state);

    if on_lambda {
        tracing::info!("Serving through the Lambda runtime");
        return lambda_http::run(app)
            .await
            .map_err(|e| anyhow::anyhow!("lambda runtime error: {}", e));
    }

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
///
/// An unparseable level falls back to `info`. CloudWatch stamps every
/// line itself, so timestamps are dropped on Lambda.
fn init_logging(level: &str, on_lambda: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if on_lambda {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .without_time()
            .init();
        return;
    }

    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
