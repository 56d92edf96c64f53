// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. In Lambda the variables come from
//! the function configuration; locally a `.env` file is honored.

use std::env;
use std::fmt;

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Identity provider ---
    /// Cognito user pool ID
    pub user_pool_id: String,
    /// Cognito app client ID
    pub cognito_client_id: String,
    /// Cognito app client secret (used for SECRET_HASH)
    pub cognito_client_secret: String,

    // --- Discord OAuth ---
    pub discord_client_id: String,
    pub discord_client_secret: String,
    /// Redirect URI used when the request carries no Origin header
    pub discord_redirect_uri: String,

    // --- Object store ---
    /// S3 bucket holding user files
    pub bucket: String,
    /// AWS region for the SDK clients
    pub aws_region: String,

    /// Log filter directive (`LOG_LEVEL`)
    pub log_level: String,
    /// Port for local (non-Lambda) mode
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            user_pool_id: required("USER_POOL_ID")?,
            cognito_client_id: required("COGNITO_CLIENT_ID")?,
            cognito_client_secret: required("COGNITO_CLIENT_SECRET")?.trim().to_string(),
            discord_client_id: required("DISCORD_CLIENT_ID")?,
            discord_client_secret: required("DISCORD_CLIENT_SECRET")?.trim().to_string(),
            discord_redirect_uri: required("DISCORD_REDIRECT_URI")?,
            bucket: required("BUCKET")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            user_pool_id: "us-east-1_testpool".to_string(),
            cognito_client_id: "test_cognito_client".to_string(),
            cognito_client_secret: "test_cognito_secret".to_string(),
            discord_client_id: "test_discord_client".to_string(),
            discord_client_secret: "test_discord_secret".to_string(),
            discord_redirect_uri: "http://localhost:5173/discord/oauth".to_string(),
            bucket: "hearthhub-test".to_string(),
            aws_region: "us-east-1".to_string(),
            log_level: "debug".to_string(),
            port: 8080,
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user_pool_id", &self.user_pool_id)
            .field("cognito_client_id", &self.cognito_client_id)
            .field("cognito_client_secret", &"<redacted>")
            .field("discord_client_id", &self.discord_client_id)
            .field("discord_client_secret", &"<redacted>")
            .field("discord_redirect_uri", &self.discord_redirect_uri)
            .field("bucket", &self.bucket)
            .field("aws_region", &self.aws_region)
            .field("log_level", &self.log_level)
            .field("port", &self.port)
            .finish()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("USER_POOL_ID", "pool");
        env::set_var("COGNITO_CLIENT_ID", "cognito_id");
        env::set_var("COGNITO_CLIENT_SECRET", " cognito_secret\n");
        env::set_var("DISCORD_CLIENT_ID", "discord_id");
        env::set_var("DISCORD_CLIENT_SECRET", "discord_secret");
        env::set_var("DISCORD_REDIRECT_URI", "https://example.com/discord/oauth");
        env::set_var("BUCKET", "bucket");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.user_pool_id, "pool");
        assert_eq!(config.cognito_client_secret, "cognito_secret");
        assert_eq!(config.bucket, "bucket");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Config::test_default());
        assert!(!rendered.contains("test_cognito_secret"));
        assert!(!rendered.contains("test_discord_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
