// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Token response from Discord's OAuth token endpoint, returned to the
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub scope: String,
}

/// Body of `POST /api/v1/discord/oauth`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OAuthCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "access code: 'code' is required"))]
    pub code: String,
}
