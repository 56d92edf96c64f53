// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth code exchange.

use crate::error::{AppError, Result};
use crate::models::{DiscordTokenResponse, OAuthCodeRequest};
use crate::routes::validated;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/discord/oauth", post(discord_oauth))
}

/// Exchange a Discord authorization code for tokens.
///
/// The redirect URI sent to Discord is derived from the caller's `Origin`
/// so the same backend serves every frontend deployment.
async fn discord_oauth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Json<OAuthCodeRequest>, JsonRejection>,
) -> Result<Json<DiscordTokenResponse>> {
    let req = validated(body)?;

    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());

    let tokens = state
        .discord
        .exchange_code(&req.code, origin)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to exchange code: {}", e)))?;

    tracing::info!("Discord code exchanged");
    Ok(Json(tokens))
}
