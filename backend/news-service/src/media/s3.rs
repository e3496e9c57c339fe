/// S3-backed blob store (AWS or any S3-compatible endpoint such as MinIO or R2).
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::blob::BlobStore;
use crate::config::BlobConfig;
use crate::error::{AppError, Result};
use crate::metrics::storage::record_blob_operation;

/// Uploaded images are immutable (unique names), so they can be cached for a year.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the default credential chain plus the configured region and
    /// optional custom endpoint.
    pub async fn from_config(config: &BlobConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;

        // Custom endpoints rarely support virtual-hosted buckets.
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::new(
            Client::from_conf(s3_config),
            config.bucket.clone(),
            config.public_base_url.clone(),
        )
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let size = bytes.len();
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .cache_control(IMAGE_CACHE_CONTROL)
            .body(ByteStream::from(bytes))
            .send()
            .await;

        record_blob_operation("put", result.is_ok());

        match result {
            Ok(_) => {
                debug!(bucket = %self.bucket, path, size, "Uploaded blob");
                Ok(self.public_url(path))
            }
            Err(e) => {
                error!(bucket = %self.bucket, path, error = %e, "Blob upload failed");
                Err(AppError::Storage(format!("Failed to upload {}: {}", path, e)))
            }
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        // S3 answers DeleteObject on a missing key with 204, so "already gone" succeeds.
        let result = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await;

        record_blob_operation("delete", result.is_ok());

        result.map(|_| ()).map_err(|e| {
            error!(bucket = %self.bucket, path, error = %e, "Blob delete failed");
            AppError::Storage(format!("Failed to delete {}: {}", path, e))
        })
    }

    async fn presigned_put_url(
        &self,
        path: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Internal(format!("Failed to create presigning config: {}", e)))?;

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .presigned(presigning_config)
            .await;

        record_blob_operation("presign", result.is_ok());

        match result {
            Ok(request) => {
                debug!(bucket = %self.bucket, path, ttl_secs = expires_in.as_secs(), "Presigned upload URL");
                Ok(request.uri().to_string())
            }
            Err(e) => {
                error!(bucket = %self.bucket, path, error = %e, "Presigning upload failed");
                Err(AppError::Storage(format!("Failed to presign {}: {}", path, e)))
            }
        }
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
