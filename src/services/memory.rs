// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory backends for offline testing.
//!
//! Only available in debug/test builds.

use crate::crypto::cognito_secret_hash;
use crate::error::AppError;
use crate::models::StoredObject;
use crate::services::identity::{AuthFlow, AuthTokens, IdentityPool, PoolUser};
use crate::services::storage::{ListPage, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

// ─────────────────────────────────────────────────────────────────────────────
// Identity pool
// ─────────────────────────────────────────────────────────────────────────────

struct MemoryUser {
    password: String,
    permanent: bool,
    enabled: bool,
    attributes: HashMap<String, String>,
}

#[derive(Default)]
struct PoolState {
    users: HashMap<String, MemoryUser>,
    /// refresh token -> username
    refresh_tokens: HashMap<String, String>,
    /// access token -> username
    access_tokens: HashMap<String, String>,
}

/// User pool held in memory. Verifies SECRET_HASH the way the real pool does.
pub struct MemoryIdentityPool {
    client_id: String,
    client_secret: String,
    state: Mutex<PoolState>,
    unavailable: AtomicBool,
    enable_fails: AtomicBool,
    counter: AtomicU64,
}

impl MemoryIdentityPool {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            state: Mutex::new(PoolState::default()),
            unavailable: AtomicBool::new(false),
            enable_fails: AtomicBool::new(false),
            counter: AtomicU64::new(0),
        }
    }

    /// Make every subsequent call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only `admin_enable_user` fail.
    pub fn set_enable_fails(&self, fails: bool) {
        self.enable_fails.store(fails, Ordering::SeqCst);
    }

    /// Snapshot of a user's attributes.
    pub fn attributes(&self, username: &str) -> Option<HashMap<String, String>> {
        let state = self.state.lock().unwrap();
        state.users.get(username).map(|u| u.attributes.clone())
    }

    pub fn set_attribute(&self, username: &str, name: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.get_mut(username) {
            user.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn password_is_permanent(&self, username: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.users.get(username).is_some_and(|u| u.permanent)
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Upstream(
                "InternalErrorException: service unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn mint(&self, kind: &str, username: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}-{}", kind, username, n)
    }

    fn check_secret_hash(
        &self,
        username: &str,
        parameters: &HashMap<String, String>,
    ) -> Result<(), AppError> {
        let expected = cognito_secret_hash(username, &self.client_id, &self.client_secret);
        if parameters.get("SECRET_HASH") != Some(&expected) {
            return Err(not_authorized("Unable to verify secret hash for client"));
        }
        Ok(())
    }
}

fn not_authorized(msg: &str) -> AppError {
    AppError::Unauthorized(format!("NotAuthorizedException: {}", msg))
}

fn user_not_found() -> AppError {
    AppError::NotFound("UserNotFoundException: User does not exist.".to_string())
}

#[async_trait]
impl IdentityPool for MemoryIdentityPool {
    async fn admin_get_user(&self, username: &str) -> Result<Option<PoolUser>, AppError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.users.get(username).map(|u| PoolUser {
            enabled: u.enabled,
            attributes: u.attributes.clone(),
        }))
    }

    async fn admin_create_user(
        &self,
        username: &str,
        attributes: Vec<(String, String)>,
        temporary_password: &str,
    ) -> Result<(), AppError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(username) {
            return Err(AppError::Upstream(
                "UsernameExistsException: User account already exists".to_string(),
            ));
        }

        let mut attributes: HashMap<String, String> = attributes.into_iter().collect();
        attributes.insert("sub".to_string(), format!("sub-{}", username));

        state.users.insert(
            username.to_string(),
            MemoryUser {
                password: temporary_password.to_string(),
                permanent: false,
                enabled: true,
                attributes,
            },
        );
        Ok(())
    }

    async fn admin_set_user_password(
        &self,
        username: &str,
        password: &str,
        permanent: bool,
    ) -> Result<(), AppError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let user = state.users.get_mut(username).ok_or_else(user_not_found)?;
        user.password = password.to_string();
        user.permanent = permanent;
        Ok(())
    }

    async fn admin_initiate_auth(
        &self,
        flow: AuthFlow,
        parameters: HashMap<String, String>,
    ) -> Result<AuthTokens, AppError> {
        self.check_available()?;

        let username = match flow {
            AuthFlow::AdminUserPassword => {
                let username = parameters.get("USERNAME").cloned().unwrap_or_default();
                self.check_secret_hash(&username, &parameters)?;

                let state = self.state.lock().unwrap();
                let user = state.users.get(&username).ok_or_else(user_not_found)?;
                if !user.permanent
                    || parameters.get("PASSWORD").map(String::as_str) != Some(user.password.as_str())
                {
                    return Err(not_authorized("Incorrect username or password."));
                }
                username
            }
            AuthFlow::RefreshToken => {
                let token = parameters.get("REFRESH_TOKEN").cloned().unwrap_or_default();
                let username = {
                    let state = self.state.lock().unwrap();
                    state
                        .refresh_tokens
                        .get(&token)
                        .cloned()
                        .ok_or_else(|| not_authorized("Invalid Refresh Token"))?
                };
                self.check_secret_hash(&username, &parameters)?;
                username
            }
        };

        let access_token = self.mint("access", &username);
        let id_token = self.mint("id", &username);
        let refresh_token = match flow {
            AuthFlow::AdminUserPassword => Some(self.mint("refresh", &username)),
            AuthFlow::RefreshToken => None,
        };

        let mut state = self.state.lock().unwrap();
        state
            .access_tokens
            .insert(access_token.clone(), username.clone());
        if let Some(token) = &refresh_token {
            state.refresh_tokens.insert(token.clone(), username);
        }

        Ok(AuthTokens {
            access_token: Some(access_token),
            id_token: Some(id_token),
            refresh_token,
            expires_in: 3600,
        })
    }

    async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: Vec<(String, String)>,
    ) -> Result<(), AppError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let username = state
            .access_tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| not_authorized("Invalid Access Token"))?;
        let user = state.users.get_mut(&username).ok_or_else(user_not_found)?;
        user.attributes.extend(attributes);
        Ok(())
    }

    async fn admin_enable_user(&self, username: &str) -> Result<(), AppError> {
        self.check_available()?;
        if self.enable_fails.load(Ordering::SeqCst) {
            return Err(AppError::Upstream(
                "InternalErrorException: enable failed".to_string(),
            ));
        }
        let mut state = self.state.lock().unwrap();
        state
            .users
            .get_mut(username)
            .ok_or_else(user_not_found)?
            .enabled = true;
        Ok(())
    }

    async fn admin_disable_user(&self, username: &str) -> Result<(), AppError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        state
            .users
            .get_mut(username)
            .ok_or_else(user_not_found)?
            .enabled = false;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Object store
// ─────────────────────────────────────────────────────────────────────────────

/// Bucket held in memory, recording calls for assertions.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    list_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
    /// 1-based index of the delete batch call that should fail
    fail_batch: Mutex<Option<usize>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.into());
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Number of list pages requested so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Size of each batch delete call, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn fail_batch_call(&self, call: usize) {
        *self.fail_batch.lock().unwrap() = Some(call);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("ServiceUnavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
        max_keys: i32,
    ) -> Result<ListPage, AppError> {
        self.check_available()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| continuation.as_ref().is_none_or(|after| *key > after));

        let page: Vec<StoredObject> = matching
            .by_ref()
            .take(max_keys.max(1) as usize)
            .map(|(key, data)| StoredObject {
                key: key.clone(),
                size: data.len() as i64,
            })
            .collect();

        let next = if matching.next().is_some() {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            next,
        })
    }

    async fn put_object(&self, key: &str, body: Bytes) -> Result<(), AppError> {
        self.check_available()?;
        self.insert(key, body);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.check_available()?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<(), AppError> {
        self.check_available()?;
        let call = {
            let mut sizes = self.batch_sizes.lock().unwrap();
            sizes.push(keys.len());
            sizes.len()
        };

        if *self.fail_batch.lock().unwrap() == Some(call) {
            return Err(AppError::Upstream("InternalError: batch failed".to_string()));
        }

        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}
