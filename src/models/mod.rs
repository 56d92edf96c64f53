// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod discord;
pub mod file;
pub mod user;

pub use discord::{DiscordTokenResponse, OAuthCodeRequest};
pub use file::{FileCategory, FilePolicy, StoredObject};
pub use user::{
    is_discord_id, AuthRequest, CreateUserRequest, Credentials, RefreshSessionRequest, User,
    UserStatusRequest,
};
