// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Object store service: paginated listing, uploads and batched deletes
//! under a key prefix.
//!
//! Keys are composed by the caller; this layer never checks that a key
//! belongs to any particular user.

use crate::error::AppError;
use crate::models::StoredObject;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Keys requested per list call.
pub const LIST_PAGE_SIZE: i32 = 1000;

/// Most keys a single batch delete may carry (provider limit).
pub const DELETE_BATCH_SIZE: usize = 100;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<StoredObject>,
    /// Continuation token, `None` on the last page
    pub next: Option<String>,
}

/// Raw object store operations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
        max_keys: i32,
    ) -> Result<ListPage, AppError>;

    async fn put_object(&self, key: &str, body: Bytes) -> Result<(), AppError>;

    async fn delete_object(&self, key: &str) -> Result<(), AppError>;

    /// Delete up to [`DELETE_BATCH_SIZE`] keys in one call.
    async fn delete_batch(&self, keys: &[String]) -> Result<(), AppError>;
}

/// High-level object store service.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn ObjectStore>,
    page_size: i32,
}

impl StorageService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            page_size: LIST_PAGE_SIZE,
        }
    }

    /// Override the list page size.
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// List every object under `prefix` across all pages.
    ///
    /// An object whose key equals the prefix itself (the "directory marker")
    /// is left out.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>, AppError> {
        let mut objects = Vec::new();
        let mut continuation = None;

        loop {
            let page = self
                .store
                .list_page(prefix, continuation.take(), self.page_size)
                .await
                .map_err(|e| AppError::upstream("failed to list objects", e))?;

            objects.extend(page.objects.into_iter().filter(|o| o.key != prefix));

            match page.next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        tracing::debug!(prefix = %prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    /// Store `body` at `key` in a single put.
    pub async fn upload_object(&self, key: &str, body: Bytes) -> Result<(), AppError> {
        let size = body.len();
        self.store
            .put_object(key, body)
            .await
            .map_err(|e| AppError::upstream("failed to put object", e))?;

        tracing::info!(key = %key, size_bytes = size, "Object uploaded");
        Ok(())
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.store
            .delete_object(key)
            .await
            .map_err(|e| AppError::upstream("failed to delete object", e))?;

        tracing::info!(key = %key, "Object deleted");
        Ok(())
    }

    /// Delete everything under `prefix`, [`DELETE_BATCH_SIZE`] keys at a time.
    ///
    /// Stops at the first failed batch. Batches already deleted stay
    /// deleted. Returns the number of keys removed.
    pub async fn delete_objects_with_prefix(&self, prefix: &str) -> Result<usize, AppError> {
        let keys: Vec<String> = self
            .list_objects(prefix)
            .await
            .map_err(|e| AppError::upstream("failed to list objects for deletion", e))?
            .into_iter()
            .map(|o| o.key)
            .collect();

        let mut deleted = 0;
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            self.store.delete_batch(batch).await.map_err(|e| {
                tracing::error!(
                    prefix = %prefix,
                    deleted,
                    remaining = keys.len() - deleted,
                    error = %e,
                    "Batch delete failed"
                );
                AppError::upstream("failed to delete objects batch", e)
            })?;
            deleted += batch.len();
        }

        tracing::info!(prefix = %prefix, deleted, "Deleted objects with prefix");
        Ok(deleted)
    }
}
