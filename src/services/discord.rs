// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth client: trades an authorization code for tokens.

use crate::error::AppError;
use crate::models::DiscordTokenResponse;

const DISCORD_TOKEN_ENDPOINT: &str = "https://discord.com/api/oauth2/token";

/// Discord OAuth client.
#[derive(Clone)]
pub struct DiscordService {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl DiscordService {
    /// Create a new Discord client with OAuth credentials.
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            http,
            token_url: DISCORD_TOKEN_ENDPOINT.to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Point the client at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// The redirect URI Discord expects to see again on exchange: the one
    /// the login page was served from, else the configured default.
    fn redirect_for(&self, origin: Option<&str>) -> String {
        match origin.map(|o| o.trim_end_matches('/')) {
            Some(origin) if !origin.is_empty() => format!("{}/discord/oauth", origin),
            _ => self.redirect_uri.clone(),
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Anything other than 200 is an error carrying the status code.
    pub async fn exchange_code(
        &self,
        code: &str,
        origin: Option<&str>,
    ) -> Result<DiscordTokenResponse, AppError> {
        let redirect_uri = self.redirect_for(origin);

        tracing::info!(endpoint = %self.token_url, redirect_uri = %redirect_uri, "Exchanging Discord authorization code");

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Discord token request failed");
                AppError::Upstream(format!("failed to send request: {}", e))
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::error!(status = %status, "Unexpected status code from Discord API");
            return Err(AppError::Upstream(format!(
                "discord API returned status: {}",
                status.as_u16()
            )));
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Discord token response");
            AppError::Upstream(format!("failed to parse response: {}", e))
        })
    }
}
