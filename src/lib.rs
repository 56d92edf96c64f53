// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HearthHub API: Discord sign-in, user accounts and file storage for
//! hosted Valheim servers.
//!
//! Discord OAuth identifies a player; a managed user pool holds one
//! account per Discord ID; an object store holds the player's world
//! backups, configs and mods.

pub mod config;
pub mod crypto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use models::FilePolicy;
use services::{DiscordService, IdentityService, StorageService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub policy: FilePolicy,
    pub identity: IdentityService,
    pub discord: DiscordService,
    pub storage: StorageService,
}
