use actix_web::http::header;
use actix_web::{web, HttpResponse};
use tracing::warn;

use super::AppState;
use crate::preview::render_preview;

const PREVIEW_CACHE_CONTROL: &str = "public, s-maxage=60, stale-while-revalidate=300";

/// SPA shell with the article's social-card tags. Never fails: unknown slugs and store
/// errors serve the plain shell.
pub async fn article_preview(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let article = match state.articles.published_by_slug(&path).await {
        Ok(article) => article,
        Err(e) => {
            warn!(slug = %path, error = %e, "Preview lookup failed, serving plain template");
            None
        }
    };

    let settings = &state.preview;
    let html = render_preview(
        &settings.template,
        article.as_ref(),
        &settings.base_url,
        &settings.site_name,
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::CACHE_CONTROL, PREVIEW_CACHE_CONTROL))
        .body(html)
}
