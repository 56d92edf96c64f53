// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity broker on top of the managed user pool.
//!
//! Users never sign in to the pool directly. Discord OAuth establishes
//! who they are; this service then keeps a pool account per Discord ID
//! whose password is a generated secret stored as a custom attribute.
//! That stored password is what lets a session be re-derived later
//! without the user being present.

use crate::crypto::{cognito_secret_hash, generate_password, PasswordConfig};
use crate::error::AppError;
use crate::models::user::attributes;
use crate::models::{CreateUserRequest, Credentials, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Authentication flows used against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    /// USERNAME + PASSWORD, admin-initiated
    AdminUserPassword,
    /// REFRESH_TOKEN grant
    RefreshToken,
}

/// Tokens returned by a successful auth call. The refresh token is only
/// present for password auth.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: i32,
}

/// A user record as the pool returns it.
#[derive(Debug, Clone)]
pub struct PoolUser {
    pub enabled: bool,
    pub attributes: HashMap<String, String>,
}

/// Raw user pool operations. Implemented by the Cognito SDK backend and,
/// in debug builds, an in-memory pool.
#[async_trait]
pub trait IdentityPool: Send + Sync {
    /// `Ok(None)` when no user has this username.
    async fn admin_get_user(&self, username: &str) -> Result<Option<PoolUser>, AppError>;

    /// Create a user without sending any invitation message.
    async fn admin_create_user(
        &self,
        username: &str,
        attributes: Vec<(String, String)>,
        temporary_password: &str,
    ) -> Result<(), AppError>;

    async fn admin_set_user_password(
        &self,
        username: &str,
        password: &str,
        permanent: bool,
    ) -> Result<(), AppError>;

    async fn admin_initiate_auth(
        &self,
        flow: AuthFlow,
        parameters: HashMap<String, String>,
    ) -> Result<AuthTokens, AppError>;

    /// Update attributes as the user identified by `access_token`.
    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: Vec<(String, String)>,
    ) -> Result<(), AppError>;

    async fn admin_enable_user(&self, username: &str) -> Result<(), AppError>;

    async fn admin_disable_user(&self, username: &str) -> Result<(), AppError>;
}

/// Identity broker: user lookup, creation, authentication and session refresh.
#[derive(Clone)]
pub struct IdentityService {
    pool: Arc<dyn IdentityPool>,
    client_id: String,
    client_secret: String,
}

impl IdentityService {
    pub fn new(pool: Arc<dyn IdentityPool>, client_id: String, client_secret: String) -> Self {
        Self {
            pool,
            client_id,
            client_secret,
        }
    }

    fn secret_hash(&self, user_id: &str) -> String {
        cognito_secret_hash(user_id, &self.client_id, &self.client_secret)
    }

    /// Fetch a user's attributes. The result carries no credentials.
    pub async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        let pool_user = self.pool.admin_get_user(user_id).await?.ok_or_else(|| {
            tracing::info!(discord_id = %user_id, "No user exists with username");
            AppError::NotFound(format!("user with id: {} does not exist", user_id))
        })?;

        Ok(User::from_attributes(&pool_user.attributes, pool_user.enabled))
    }

    /// Register a new user and mint their first credential bundle.
    pub async fn create_user(&self, profile: &CreateUserRequest) -> Result<Credentials, AppError> {
        let password = generate_password(&PasswordConfig::default())
            .map_err(|e| AppError::Upstream(format!("error generating password: {}", e)))?;

        let attrs = vec![
            (attributes::EMAIL.to_string(), profile.discord_email.clone()),
            (attributes::DISCORD_ID.to_string(), profile.discord_id.clone()),
            (
                attributes::DISCORD_USERNAME.to_string(),
                profile.discord_username.clone(),
            ),
            (attributes::AVATAR_ID.to_string(), profile.avatar_id.clone()),
            (attributes::TEMPORARY_PASSWORD.to_string(), password.clone()),
            (attributes::REFRESH_TOKEN.to_string(), "nil".to_string()),
        ];

        self.pool
            .admin_create_user(&profile.discord_id, attrs, &password)
            .await
            .map_err(|e| AppError::Upstream(format!("error creating user: {}", e)))?;

        // Make the password permanent so the account is not stuck in
        // FORCE_CHANGE_PASSWORD.
        self.pool
            .admin_set_user_password(&profile.discord_id, &password, true)
            .await
            .map_err(|e| AppError::Upstream(format!("error setting permanent password: {}", e)))?;

        tracing::info!(discord_id = %profile.discord_id, "User created");
        self.initiate_auth_user_pass(&profile.discord_id, &password)
            .await
    }

    /// Username/password auth, then store the new refresh token on the user
    /// so admins can act on their behalf later.
    async fn initiate_auth_user_pass(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Credentials, AppError> {
        let params = HashMap::from([
            ("USERNAME".to_string(), user_id.to_string()),
            ("PASSWORD".to_string(), password.to_string()),
            ("SECRET_HASH".to_string(), self.secret_hash(user_id)),
        ]);

        let tokens = self
            .pool
            .admin_initiate_auth(AuthFlow::AdminUserPassword, params)
            .await
            .map_err(|e| {
                AppError::Upstream(format!(
                    "error initiating admin user/pass auth with user pool: {}",
                    e
                ))
            })?;

        let credentials = credentials_from(tokens, None)?;

        self.pool
            .update_user_attributes(
                &credentials.access_token,
                vec![(
                    attributes::REFRESH_TOKEN.to_string(),
                    credentials.refresh_token.clone(),
                )],
            )
            .await
            .map_err(|e| {
                tracing::error!(discord_id = %user_id, error = %e, "Could not store refresh token");
                AppError::Upstream("could not update user attributes with access token".to_string())
            })?;

        Ok(credentials)
    }

    /// Check a refresh token belongs to `user_id` and return the full user
    /// with fresh credentials.
    ///
    /// Disabled accounts still authenticate; clients send those users back
    /// through Discord.
    pub async fn authenticate(&self, refresh_token: &str, user_id: &str) -> Option<User> {
        let params = HashMap::from([
            ("REFRESH_TOKEN".to_string(), refresh_token.to_string()),
            ("SECRET_HASH".to_string(), self.secret_hash(user_id)),
        ]);

        let tokens = match self
            .pool
            .admin_initiate_auth(AuthFlow::RefreshToken, params)
            .await
        {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(discord_id = %user_id, error = %e, "User could not be authenticated");
                return None;
            }
        };

        let credentials = match credentials_from(tokens, Some(refresh_token)) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(discord_id = %user_id, error = %e, "Incomplete auth result");
                return None;
            }
        };

        let pool_user = match self.pool.admin_get_user(user_id).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                tracing::warn!(discord_id = %user_id, "Authenticated user not found");
                return None;
            }
            Err(e) => {
                tracing::error!(discord_id = %user_id, error = %e, "Could not get user");
                return None;
            }
        };

        let mut user = User::from_attributes(&pool_user.attributes, pool_user.enabled);
        user.credentials = Some(credentials);
        Some(user)
    }

    /// Mint a new credential bundle (including a new refresh token) for a
    /// user using their stored generated password.
    pub async fn refresh_session(&self, user_id: &str) -> Result<Credentials, AppError> {
        let pool_user = match self.pool.admin_get_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!(discord_id = %user_id, "No user to refresh session for");
                return Err(AppError::Upstream(format!(
                    "failed to get user for discord id: {}: user not found",
                    user_id
                )));
            }
            Err(e) => {
                tracing::error!(discord_id = %user_id, error = %e, "Failed to get user for session refresh");
                return Err(AppError::Upstream(format!(
                    "failed to get user for discord id: {}: {}",
                    user_id, e
                )));
            }
        };

        let password = pool_user
            .attributes
            .get(attributes::TEMPORARY_PASSWORD)
            .cloned()
            .unwrap_or_default();

        tracing::info!(discord_id = %user_id, "Re-authenticating user with stored password");
        self.initiate_auth_user_pass(user_id, &password)
            .await
            .map_err(|e| {
                tracing::error!(discord_id = %user_id, error = %e, "Failed to auth with user/pass");
                AppError::Upstream(format!(
                    "failed to auth with user/pass for discord id: {}",
                    user_id
                ))
            })
    }

    /// Enable a user. Errors are logged and reported as `false`.
    pub async fn enable_user(&self, user_id: &str) -> bool {
        match self.pool.admin_enable_user(user_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(discord_id = %user_id, error = %e, "Failed to enable user");
                false
            }
        }
    }

    /// Disable a user. Errors are logged and reported as `false`.
    pub async fn disable_user(&self, user_id: &str) -> bool {
        match self.pool.admin_disable_user(user_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(discord_id = %user_id, error = %e, "Failed to disable user");
                false
            }
        }
    }
}

/// Turn an auth result into a credential bundle. `refresh_override` is
/// used for refresh grants, which do not return a new refresh token.
fn credentials_from(
    tokens: AuthTokens,
    refresh_override: Option<&str>,
) -> Result<Credentials, AppError> {
    let missing = |what: &str| AppError::Upstream(format!("auth result missing {}", what));

    Ok(Credentials {
        access_token: tokens.access_token.ok_or_else(|| missing("access token"))?,
        id_token: tokens.id_token.ok_or_else(|| missing("id token"))?,
        refresh_token: match refresh_override {
            Some(token) => token.to_string(),
            None => tokens.refresh_token.ok_or_else(|| missing("refresh token"))?,
        },
        token_expiration: tokens.expires_in,
    })
}
