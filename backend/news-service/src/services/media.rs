use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::Actor;
use crate::error::{AppError, Result};
use crate::media::{
    content_type_for_extension, extension_for_content_type, file_extension, is_allowed_extension,
    normalize_content_type, unique_filename, validate_image, BlobStore, FOLDERS, FOLDER_ARTICLES,
};

/// Direct uploads must start within 15 minutes of being granted.
pub const DEFAULT_UPLOAD_URL_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub blob_path: String,
}

/// Grant for a single direct upload to the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadUrl {
    /// Signed URL to `PUT` the image to
    pub upload_url: String,
    pub blob_path: String,
    /// Where the image is served once uploaded
    pub url: String,
    /// `Content-Type` the `PUT` must send
    pub content_type: String,
    pub expires_in_secs: u64,
}

/// Image uploads into the blob store.
pub struct MediaService {
    blobs: Arc<dyn BlobStore>,
    upload_url_ttl: Duration,
}

impl MediaService {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            upload_url_ttl: DEFAULT_UPLOAD_URL_TTL,
        }
    }

    pub fn with_upload_url_ttl(mut self, ttl: Duration) -> Self {
        self.upload_url_ttl = ttl;
        self
    }

    /// Validate and store an image under `folder` (default `articles`).
    ///
    /// The stored name is unique; only the original extension survives.
    pub async fn upload(
        &self,
        actor: &Actor,
        folder: Option<&str>,
        filename: Option<&str>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage> {
        ensure_creator(actor)?;
        let folder = resolve_folder(folder)?;

        let errors = validate_image(content_type, bytes.len());
        if !errors.is_empty() {
            return Err(AppError::Validation(errors.join("; ")));
        }

        let original = match filename.map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) => {
                checked_extension(name)?;
                name.to_string()
            }
            None => {
                let ext = extension_for_content_type(content_type).ok_or_else(|| {
                    AppError::Validation(format!("Unsupported content type '{}'", content_type))
                })?;
                format!("upload.{}", ext)
            }
        };

        let blob_path = format!("{}/{}", folder, unique_filename(&original, None));
        let size = bytes.len();
        let url = self
            .blobs
            .put(&blob_path, bytes, &normalize_content_type(content_type))
            .await?;

        info!(actor_id = %actor.id, path = %blob_path, size, "Image uploaded");
        Ok(UploadedImage { url, blob_path })
    }

    /// Grant a short-lived, write-only URL so the client can send `filename` straight
    /// to the blob store. The object gets a unique name under `folder`.
    pub async fn upload_url(
        &self,
        actor: &Actor,
        folder: Option<&str>,
        filename: &str,
    ) -> Result<UploadUrl> {
        ensure_creator(actor)?;
        let folder = resolve_folder(folder)?;

        let filename = filename.trim();
        if filename.is_empty() {
            return Err(AppError::BadRequest("filename is required".to_string()));
        }
        let ext = checked_extension(filename)?;
        let content_type = content_type_for_extension(&ext).ok_or_else(|| {
            AppError::Validation(format!("Invalid file extension for '{}'", filename))
        })?;

        let blob_path = format!("{}/{}", folder, unique_filename(filename, None));
        let upload_url = self
            .blobs
            .presigned_put_url(&blob_path, content_type, self.upload_url_ttl)
            .await?;

        info!(
            actor_id = %actor.id,
            path = %blob_path,
            ttl_secs = self.upload_url_ttl.as_secs(),
            "Upload URL granted"
        );
        Ok(UploadUrl {
            upload_url,
            url: self.blobs.public_url(&blob_path),
            blob_path,
            content_type: content_type.to_string(),
            expires_in_secs: self.upload_url_ttl.as_secs(),
        })
    }
}

fn ensure_creator(actor: &Actor) -> Result<()> {
    if actor.role.is_creator() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only creators can upload images".to_string(),
        ))
    }
}

/// `folder` or `articles`, provided it is one of the known folders.
fn resolve_folder(folder: Option<&str>) -> Result<&str> {
    let folder = folder.map(str::trim).filter(|f| !f.is_empty()).unwrap_or(FOLDER_ARTICLES);
    if FOLDERS.contains(&folder) {
        Ok(folder)
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown folder '{}'. Allowed: {}",
            folder,
            FOLDERS.join(", ")
        )))
    }
}

fn checked_extension(filename: &str) -> Result<String> {
    match file_extension(filename) {
        Some(ext) if is_allowed_extension(&ext) => Ok(ext),
        _ => Err(AppError::Validation(format!(
            "Invalid file extension for '{}'",
            filename
        ))),
    }
}
