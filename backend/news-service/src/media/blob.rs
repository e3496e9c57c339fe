use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::Result;

/// Object storage for uploaded images.
///
/// Paths are bucket-relative (`articles/1718000000000-a1b2c3.png`). Public URLs are the
/// store's public base URL followed by the path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return its public URL.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Remove the blob at `path`. A blob that is already gone counts as deleted.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Write-only URL a client can `PUT` the object to directly until `expires_in`
    /// elapses. The upload must carry `content_type`.
    async fn presigned_put_url(
        &self,
        path: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String>;

    /// Public URL prefix of this store, without a trailing slash.
    fn public_base_url(&self) -> &str;

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Bucket-relative path of a URL served by this store; `None` for foreign URLs.
    fn blob_path_from_url(&self, url: &str) -> Option<String> {
        let base = self.public_base_url().trim_end_matches('/');
        let rest = url.trim().strip_prefix(base)?.strip_prefix('/')?;
        let path = rest
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();

        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store kept in process memory, for tests and local development.
pub struct InMemoryBlobStore {
    public_base_url: String,
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, path: &str) -> Option<StoredBlob> {
        self.blobs.read().await.get(path).cloned()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.blobs.write().await.insert(
            path.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.blobs.write().await.remove(path);
        Ok(())
    }

    /// Nothing signs these; the URL only records what was granted.
    async fn presigned_put_url(
        &self,
        path: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String> {
        Ok(format!(
            "{}?upload=memory&content-type={}&expires-in={}",
            self.public_url(path),
            content_type.replace('/', "%2F"),
            expires_in.as_secs()
        ))
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
