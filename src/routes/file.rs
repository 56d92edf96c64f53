// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File routes: list, upload and delete objects under a user's prefix.
//!
//! Every request re-authenticates the caller with their refresh token and
//! only touches keys under `{category}/{discordId}/`.

use crate::error::{AppError, Result};
use crate::models::{is_discord_id, StoredObject};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Request body ceiling on the upload route. Kept above the upload policy
/// so oversize files get the policy's 400 instead of a 413.
const UPLOAD_BODY_LIMIT: usize = 64 << 20;

const UNAUTHORIZED: &str = "unauthorized: authenticated user id does not match given discord id";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/file", get(list_files).delete(delete_files))
        .route(
            "/api/v1/file/upload",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    #[serde(default)]
    pub discord_id: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub prefix: String,
    pub filename: Option<String>,
}

impl FileQuery {
    fn require_identity(&self) -> Result<()> {
        if self.discord_id.is_empty() {
            return Err(AppError::Validation(
                "discordId query parameter is required".to_string(),
            ));
        }
        if !is_discord_id(&self.discord_id) {
            return Err(AppError::Validation(format!(
                "invalid discord id: {}",
                self.discord_id
            )));
        }
        if self.refresh_token.is_empty() {
            return Err(AppError::Validation(
                "refreshToken query parameter is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<StoredObject>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// The refresh token must authenticate as exactly `discord_id`.
async fn authorize(state: &AppState, discord_id: &str, refresh_token: &str) -> Result<()> {
    tracing::info!(discord_id = %discord_id, "Authenticating user");
    match state.identity.authenticate(refresh_token, discord_id).await {
        Some(user) if user.discord_id == discord_id => Ok(()),
        Some(user) => {
            tracing::error!(
                discord_id = %discord_id,
                authenticated_id = %user.discord_id,
                "Authenticated user does not match given discord id"
            );
            Err(AppError::Unauthorized(UNAUTHORIZED.to_string()))
        }
        None => Err(AppError::Unauthorized(UNAUTHORIZED.to_string())),
    }
}

/// Strip any directory components a client sent with the file name.
fn base_name(filename: &str) -> Option<&str> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
}

// ─── Listing ─────────────────────────────────────────────────

/// List the caller's files in a category, plus the category's shared
/// sources (general mods, automatic backups).
async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileListResponse>> {
    query.require_identity()?;
    authorize(&state, &query.discord_id, &query.refresh_token).await?;
    let category = state.policy.check_category(&query.prefix)?;

    let prefix = category.user_prefix(&query.discord_id);
    tracing::info!(discord_id = %query.discord_id, prefix = %prefix, "Listing objects");
    let mut files = state.storage.list_objects(&prefix).await?;

    for extra in category.extra_sources(&query.discord_id) {
        tracing::debug!(prefix = %extra, "Listing extra source");
        files.extend(state.storage.list_objects(&extra).await?);
    }

    Ok(Json(FileListResponse { files }))
}

// ─── Upload ──────────────────────────────────────────────────

fn no_file(cause: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("no file provided: {}", cause))
}

/// Pull the `file` field out of the form.
async fn read_file_field(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(String, Bytes)> {
    let mut multipart = multipart.map_err(|e| no_file(e.body_text()))?;
    while let Some(field) = multipart.next_field().await.map_err(no_file)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(no_file)?;
        return Ok((filename, data));
    }

    Err(no_file("missing form field 'file'"))
}

/// Upload one file to `{prefix}/{discordId}/{filename}`.
async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileQuery>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>> {
    let (filename, data) = read_file_field(multipart).await?;
    query.require_identity()?;
    state.policy.check_size(data.len())?;

    let filename = base_name(&filename).unwrap_or_default();
    state.policy.check_extension(filename)?;
    let category = state.policy.check_category(&query.prefix)?;

    authorize(&state, &query.discord_id, &query.refresh_token).await?;

    let key = category.user_key(&query.discord_id, filename);
    state.storage.upload_object(&key, data).await.map_err(|e| {
        AppError::Upstream(format!("failed to upload file: {}", e))
    })?;

    Ok(Json(MessageResponse {
        message: format!("file upload ok: {}", key),
    }))
}

// ─── Deletion ────────────────────────────────────────────────

/// Delete one file, or every file the caller has in a category when no
/// filename is given.
async fn delete_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileQuery>,
) -> Result<Json<MessageResponse>> {
    query.require_identity()?;
    authorize(&state, &query.discord_id, &query.refresh_token).await?;
    let category = state.policy.check_category(&query.prefix)?;

    let message = match query.filename.as_deref().filter(|f| !f.is_empty()) {
        Some(filename) => {
            let name = base_name(filename)
                .filter(|n| *n == filename)
                .ok_or_else(|| AppError::Validation(format!("invalid filename: {}", filename)))?;
            let key = category.user_key(&query.discord_id, name);
            state.storage.delete_object(&key).await?;
            format!("file deleted: {}", key)
        }
        None => {
            let prefix = category.user_prefix(&query.discord_id);
            let deleted = state.storage.delete_objects_with_prefix(&prefix).await?;
            format!("deleted {} files under: {}", deleted, prefix)
        }
    };

    Ok(Json(MessageResponse { message }))
}
