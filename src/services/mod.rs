// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, OAuth and object storage.

pub mod cognito;
pub mod discord;
pub mod identity;
#[cfg(debug_assertions)]
pub mod memory;
pub mod s3;
pub mod storage;

pub use cognito::CognitoPool;
pub use discord::DiscordService;
pub use identity::{IdentityPool, IdentityService};
#[cfg(debug_assertions)]
pub use memory::{MemoryIdentityPool, MemoryObjectStore};
pub use s3::S3ObjectStore;
pub use storage::{ObjectStore, StorageService};
