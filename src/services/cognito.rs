// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cognito user pool implementation of [`IdentityPool`].

use crate::error::AppError;
use crate::services::identity::{AuthFlow, AuthTokens, IdentityPool, PoolUser};
use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client;
use std::collections::HashMap;

/// Cognito user pool client bound to one pool and app client.
#[derive(Clone)]
pub struct CognitoPool {
    client: Client,
    user_pool_id: String,
    client_id: String,
}

impl CognitoPool {
    pub fn new(client: Client, user_pool_id: String, client_id: String) -> Self {
        Self {
            client,
            user_pool_id,
            client_id,
        }
    }
}

fn to_attributes(pairs: Vec<(String, String)>) -> Result<Vec<AttributeType>, AppError> {
    pairs
        .into_iter()
        .map(|(name, value)| AttributeType::builder().name(name).value(value).build())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Upstream(format!("invalid user attribute: {}", e)))
}

fn sdk_error<E>(e: &E) -> AppError
where
    E: std::error::Error,
{
    AppError::Upstream(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl IdentityPool for CognitoPool {
    async fn admin_get_user(&self, username: &str) -> Result<Option<PoolUser>, AppError> {
        let result = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_user_not_found_exception()) =>
            {
                return Ok(None);
            }
            Err(e) => return Err(sdk_error(&e)),
        };

        let attributes = output
            .user_attributes()
            .iter()
            .map(|attr| {
                (
                    attr.name().to_string(),
                    attr.value().unwrap_or_default().to_string(),
                )
            })
            .collect();

        Ok(Some(PoolUser {
            enabled: output.enabled(),
            attributes,
        }))
    }

    async fn admin_create_user(
        &self,
        username: &str,
        attributes: Vec<(String, String)>,
        temporary_password: &str,
    ) -> Result<(), AppError> {
        self.client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .set_user_attributes(Some(to_attributes(attributes)?))
            .message_action(MessageActionType::Suppress)
            .temporary_password(temporary_password)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        Ok(())
    }

    async fn admin_set_user_password(
        &self,
        username: &str,
        password: &str,
        permanent: bool,
    ) -> Result<(), AppError> {
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .password(password)
            .permanent(permanent)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        Ok(())
    }

    async fn admin_initiate_auth(
        &self,
        flow: AuthFlow,
        parameters: HashMap<String, String>,
    ) -> Result<AuthTokens, AppError> {
        let auth_flow = match flow {
            AuthFlow::AdminUserPassword => AuthFlowType::AdminUserPasswordAuth,
            AuthFlow::RefreshToken => AuthFlowType::RefreshTokenAuth,
        };

        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(auth_flow)
            .set_auth_parameters(Some(parameters))
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        // A challenge instead of a result means the account is not in a
        // state we can sign in to.
        let result = output.authentication_result().ok_or_else(|| {
            AppError::Upstream(format!(
                "auth returned challenge {:?} instead of tokens",
                output.challenge_name()
            ))
        })?;

        Ok(AuthTokens {
            access_token: result.access_token().map(str::to_string),
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
            expires_in: result.expires_in(),
        })
    }

    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: Vec<(String, String)>,
    ) -> Result<(), AppError> {
        self.client
            .update_user_attributes()
            .access_token(access_token)
            .set_user_attributes(Some(to_attributes(attributes)?))
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        Ok(())
    }

    async fn admin_enable_user(&self, username: &str) -> Result<(), AppError> {
        self.client
            .admin_enable_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        Ok(())
    }

    async fn admin_disable_user(&self, username: &str) -> Result<(), AppError> {
        self.client
            .admin_disable_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        Ok(())
    }
}
