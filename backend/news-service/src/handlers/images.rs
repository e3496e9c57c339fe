use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct UploadUrlParams {
    pub folder: Option<String>,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub folder: Option<String>,
    pub filename: Option<String>,
}

/// Upload one image sent as the raw request body; the `Content-Type` header names
/// the image type.
pub async fn upload_image(
    http_req: HttpRequest,
    query: web::Query<UploadParams>,
    body: web::Bytes,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let actor = state.actor(&user).await?;
    let uploaded = state
        .media
        .upload(
            &actor,
            query.folder.as_deref(),
            query.filename.as_deref(),
            content_type,
            body.to_vec(),
        )
        .await?;

    Ok(HttpResponse::Created().json(uploaded))
}

/// Grant a write-only URL for uploading one image straight to the blob store.
pub async fn create_upload_url(
    query: web::Query<UploadUrlParams>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let grant = state
        .media
        .upload_url(&actor, query.folder.as_deref(), &query.filename)
        .await?;

    Ok(HttpResponse::Ok().json(grant))
}
