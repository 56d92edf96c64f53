// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! S3 implementation of [`ObjectStore`].

use crate::error::AppError;
use crate::models::StoredObject;
use crate::services::storage::{ListPage, ObjectStore};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;

/// S3 bucket backend.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<String>,
        max_keys: i32,
    ) -> Result<ListPage, AppError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| AppError::Upstream(DisplayErrorContext(&e).to_string()))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|o| {
                o.key().map(|key| StoredObject {
                    key: key.to_string(),
                    size: o.size().unwrap_or_default(),
                })
            })
            .collect();

        let next = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage { objects, next })
    }

    async fn put_object(&self, key: &str, body: Bytes) -> Result<(), AppError> {
        let start = std::time::Instant::now();
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                AppError::Upstream(DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<(), AppError> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| AppError::Upstream(DisplayErrorContext(&e).to_string()))?;

        // Quiet mode only reports the keys that failed.
        if let Some(first) = output.errors().first() {
            return Err(AppError::Upstream(format!(
                "{} of {} keys not deleted, first: {} ({})",
                output.errors().len(),
                keys.len(),
                first.key().unwrap_or_default(),
                first.message().unwrap_or_default()
            )));
        }

        Ok(())
    }
}
