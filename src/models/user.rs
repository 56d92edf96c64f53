// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for the identity provider and API.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use validator::{Validate, ValidationError};

/// Attribute names stored on each identity provider user.
pub mod attributes {
    pub const EMAIL: &str = "email";
    /// Provider-assigned subject ID
    pub const SUB: &str = "sub";
    pub const DISCORD_ID: &str = "custom:discord_id";
    pub const DISCORD_USERNAME: &str = "custom:discord_username";
    pub const AVATAR_ID: &str = "custom:avatar_id";
    /// Generated password, kept so sessions can be re-derived without the user
    pub const TEMPORARY_PASSWORD: &str = "custom:temporary_password";
    /// Latest refresh token, kept for admin-initiated refresh
    pub const REFRESH_TOKEN: &str = "custom:refresh_token";
    /// JSON object of mod name -> installed flag
    pub const INSTALLED_MODS: &str = "custom:installed_mods";
}

/// Token bundle minted by the identity provider.
///
/// Never persisted here; the caller stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub refresh_token: String,
    #[serde(rename = "token_expiration_seconds")]
    pub token_expiration: i32,
    pub access_token: String,
    pub id_token: String,
}

/// A user as held by the identity provider. The Discord ID is the
/// provider username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub cognito_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub discord_username: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub email: String,
    #[serde(default)]
    pub avatar_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub discord_id: String,
    #[serde(default)]
    pub account_enabled: bool,
    #[serde(default)]
    pub installed_mods: BTreeMap<String, bool>,
    /// Absent when the user was fetched without authenticating.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub credentials: Option<Credentials>,
}

impl User {
    /// Build a user from the provider's attribute map.
    pub fn from_attributes(attrs: &HashMap<String, String>, enabled: bool) -> Self {
        let get = |name: &str| attrs.get(name).cloned().unwrap_or_default();

        let installed_mods = attrs
            .get(attributes::INSTALLED_MODS)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Self {
            cognito_id: get(attributes::SUB),
            discord_username: get(attributes::DISCORD_USERNAME),
            email: get(attributes::EMAIL),
            avatar_id: get(attributes::AVATAR_ID),
            discord_id: get(attributes::DISCORD_ID),
            account_enabled: enabled,
            installed_mods,
            credentials: None,
        }
    }
}

/// Discord IDs are snowflakes: decimal digits only. They become object
/// key segments, so anything else could collide with shared prefixes.
pub fn is_discord_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Validator rule for [`is_discord_id`]. Empty IDs are left to the
/// `length` rule.
pub fn validate_discord_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || is_discord_id(id) {
        return Ok(());
    }
    Err(ValidationError::new("discord_id")
        .with_message(Cow::Owned(format!("invalid discord id: {}", id))))
}

/// Body of `POST /api/v1/cognito/create-user`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "discord_id is required"),
        custom(function = validate_discord_id)
    )]
    pub discord_id: String,
    #[serde(default)]
    pub discord_username: String,
    #[serde(default)]
    pub discord_email: String,
    #[serde(default)]
    pub avatar_id: String,
}

/// Body of `POST /api/v1/cognito/auth`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "invalid request body: discordId or refreshToken missing"))]
    pub discord_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "invalid request body: discordId or refreshToken missing"))]
    pub refresh_token: String,
}

/// Body of `POST /api/v1/cognito/refresh-session`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "invalid request body: discordId missing"))]
    pub discord_id: String,
}

/// Body of `POST /api/v1/cognito/user-status`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "invalid request body: discordId or refreshToken missing"))]
    pub discord_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "invalid request body: discordId or refreshToken missing"))]
    pub refresh_token: String,
    pub account_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_attributes() {
        let user = User::from_attributes(
            &attrs(&[
                (attributes::SUB, "abc-123"),
                (attributes::EMAIL, "viking@example.com"),
                (attributes::DISCORD_ID, "4242"),
                (attributes::DISCORD_USERNAME, "ragnar"),
                (attributes::AVATAR_ID, "av1"),
                (attributes::TEMPORARY_PASSWORD, "not-exposed"),
                (attributes::INSTALLED_MODS, r#"{"ValheimPlus":true}"#),
            ]),
            true,
        );

        assert_eq!(user.cognito_id, "abc-123");
        assert_eq!(user.discord_id, "4242");
        assert_eq!(user.discord_username, "ragnar");
        assert!(user.account_enabled);
        assert_eq!(user.installed_mods.get("ValheimPlus"), Some(&true));
        assert!(user.credentials.is_none());
    }

    #[test]
    fn test_malformed_installed_mods_is_empty() {
        let user = User::from_attributes(&attrs(&[(attributes::INSTALLED_MODS, "nil")]), false);
        assert!(user.installed_mods.is_empty());
    }

    #[test]
    fn test_user_json_shape() {
        let user = User {
            discord_id: "4242".into(),
            account_enabled: true,
            credentials: Some(Credentials {
                refresh_token: "r".into(),
                token_expiration: 3600,
                access_token: "a".into(),
                id_token: "i".into(),
            }),
            ..User::default()
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["discordId"], "4242");
        assert_eq!(json["accountEnabled"], true);
        assert_eq!(json["installedMods"], serde_json::json!({}));
        assert_eq!(json["credentials"]["token_expiration_seconds"], 3600);
        assert!(json.get("cognitoId").is_none());
    }

    #[test]
    fn test_discord_id_rule() {
        assert!(is_discord_id("123456789012345678"));
        assert!(!is_discord_id(""));
        assert!(!is_discord_id("general"));
        assert!(!is_discord_id("1/x"));
        assert!(!is_discord_id("42 "));

        let req: CreateUserRequest =
            serde_json::from_str(r#"{"discord_id":"general"}"#).unwrap();
        let err = req.validate().unwrap_err();
        let messages: Vec<_> = err.field_errors()["discord_id"]
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        assert_eq!(messages, vec!["invalid discord id: general".to_string()]);
    }

    #[test]
    fn test_auth_request_validation() {
        let req: AuthRequest = serde_json::from_str(r#"{"discordId":"1"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: AuthRequest =
            serde_json::from_str(r#"{"discordId":"1","refreshToken":"t"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
