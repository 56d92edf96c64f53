// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User pool routes: registration, authentication, session refresh,
//! lookup and account status.

use crate::error::{AppError, Result};
use crate::models::{
    AuthRequest, CreateUserRequest, Credentials, RefreshSessionRequest, User, UserStatusRequest,
};
use crate::routes::validated;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/cognito/create-user", post(create_user))
        .route("/api/v1/cognito/auth", post(auth))
        .route("/api/v1/cognito/refresh-session", post(refresh_session))
        .route("/api/v1/cognito/get-user", get(get_user))
        .route("/api/v1/cognito/user-status", post(user_status))
}

// ─── Registration ────────────────────────────────────────────

/// Build the response user from the submitted profile.
fn profile_user(
    req: &CreateUserRequest,
    installed_mods: BTreeMap<String, bool>,
    credentials: Credentials,
) -> User {
    User {
        cognito_id: String::new(),
        discord_username: req.discord_username.clone(),
        email: req.discord_email.clone(),
        avatar_id: req.avatar_id.clone(),
        discord_id: req.discord_id.clone(),
        account_enabled: true,
        installed_mods,
        credentials: Some(credentials),
    }
}

/// Create a user, or re-enable and refresh an existing one.
///
/// Signing in with Discord again must never fail just because the
/// account already exists.
async fn create_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let req = validated(body)?;

    let existing = match state.identity.get_user(&req.discord_id).await {
        Ok(user) => Some(user),
        Err(AppError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let Some(existing) = existing else {
        let credentials = state.identity.create_user(&req).await.map_err(|e| {
            tracing::error!(discord_id = %req.discord_id, error = %e, "Error creating user");
            AppError::Upstream(format!("error while creating new cognito user: {}", e))
        })?;

        // A new user has no mods installed.
        return Ok(Json(profile_user(&req, BTreeMap::new(), credentials)));
    };

    tracing::info!(discord_id = %req.discord_id, "User already exists, re-enabling and refreshing session");
    if !state.identity.enable_user(&req.discord_id).await {
        tracing::warn!(discord_id = %req.discord_id, "Could not re-enable existing user, refreshing session anyway");
    }

    let credentials = state
        .identity
        .refresh_session(&req.discord_id)
        .await
        .map_err(|e| {
            tracing::error!(discord_id = %req.discord_id, error = %e, "Failed to refresh existing user session");
            AppError::Validation(format!(
                "user with discord id: {} already exists. failed to refresh session",
                req.discord_id
            ))
        })?;

    Ok(Json(profile_user(&req, existing.installed_mods, credentials)))
}

// ─── Authentication ──────────────────────────────────────────

/// Authenticate with a refresh token, returning the user with fresh
/// credentials.
async fn auth(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let req = validated(body)?;

    state
        .identity
        .authenticate(&req.refresh_token, &req.discord_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("user unauthorized".to_string()))
}

/// Mint a new credential bundle from the stored password.
async fn refresh_session(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RefreshSessionRequest>, JsonRejection>,
) -> Result<Json<Credentials>> {
    let req = validated(body)?;

    let credentials = state
        .identity
        .refresh_session(&req.discord_id)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to refresh user session: {}", e)))?;

    Ok(Json(credentials))
}

// ─── Lookup ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserQuery {
    #[serde(default)]
    pub discord_id: String,
}

/// Look a user up by Discord ID. No credentials are returned.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetUserQuery>,
) -> Result<Json<User>> {
    if query.discord_id.is_empty() {
        return Err(AppError::Validation(
            "discordId query parameter is required".to_string(),
        ));
    }

    let user = state.identity.get_user(&query.discord_id).await?;
    Ok(Json(user))
}

// ─── Account Status ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub discord_id: String,
    pub account_enabled: bool,
}

/// Enable or disable the caller's own account.
async fn user_status(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<UserStatusRequest>, JsonRejection>,
) -> Result<Json<UserStatusResponse>> {
    let req = validated(body)?;

    let authorized = state
        .identity
        .authenticate(&req.refresh_token, &req.discord_id)
        .await
        .is_some_and(|user| user.discord_id == req.discord_id);
    if !authorized {
        return Err(AppError::Unauthorized("user unauthorized".to_string()));
    }

    let ok = if req.account_enabled {
        state.identity.enable_user(&req.discord_id).await
    } else {
        state.identity.disable_user(&req.discord_id).await
    };

    if !ok {
        return Err(AppError::Upstream(format!(
            "failed to update account status for discord id: {}",
            req.discord_id
        )));
    }

    tracing::info!(discord_id = %req.discord_id, enabled = req.account_enabled, "Account status updated");
    Ok(Json(UserStatusResponse {
        discord_id: req.discord_id,
        account_enabled: req.account_enabled,
    }))
}
