/// HTTP handlers for news-service
///
/// - Health: liveness/readiness probes
/// - Feed: ranked feed, trending, search
/// - Articles: authoring, lookup, views, analytics
/// - Images: raw-body image upload and direct-upload URLs
/// - Admin: users, roles, featured articles
/// - Preview: server-rendered link previews for crawlers
pub mod admin;
pub mod articles;
pub mod feed;
pub mod health;
pub mod images;
pub mod preview;

pub use admin::{list_users, set_featured, update_role};
pub use articles::{
    article_analytics, create_article, delete_article, get_article, get_article_by_slug,
    my_articles, my_profile, record_view, update_article,
};
pub use feed::{get_feed, get_trending, search_articles};
pub use health::{health, liveness, readiness};
pub use images::{create_upload_url, upload_image};
pub use preview::article_preview;

use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::media::{BlobStore, MAX_IMAGE_BYTES};
use crate::metrics::serve_metrics;
use crate::middleware::AuthUser;
use crate::services::{Actor, ArticleService, FeedService, MediaService, UserService};
use crate::store::{ArticleStore, UserStore};

/// SPA shell and site identity used for link previews.
#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub template: String,
    pub base_url: String,
    pub site_name: String,
}

/// Shared handler state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub feed: FeedService,
    pub articles: ArticleService,
    pub media: MediaService,
    pub users: UserService,
    pub preview: PreviewSettings,
}

impl AppState {
    pub fn new(
        config: &Config,
        article_store: Arc<dyn ArticleStore>,
        user_store: Arc<dyn UserStore>,
        blob_store: Arc<dyn BlobStore>,
        preview_template: String,
    ) -> Self {
        Self {
            feed: FeedService::new(article_store.clone(), config.feed.clone()),
            articles: ArticleService::new(article_store, user_store.clone(), blob_store.clone()),
            media: MediaService::new(blob_store)
                .with_upload_url_ttl(Duration::from_secs(config.blob.upload_url_ttl_secs)),
            users: UserService::new(user_store),
            preview: PreviewSettings {
                template: preview_template,
                base_url: config.app.public_base_url.clone(),
                site_name: config.preview.site_name.clone(),
            },
        }
    }

    /// Caller with the role the profile store grants them.
    pub async fn actor(&self, user: &AuthUser) -> Result<Actor> {
        self.users.resolve_actor(&user.0).await
    }

    pub async fn maybe_actor(&self, user: Option<&AuthUser>) -> Result<Option<Actor>> {
        match user {
            Some(user) => Ok(Some(self.actor(user).await?)),
            None => Ok(None),
        }
    }
}

/// Register every route. `AppState` must already be in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/metrics", web::get().to(serve_metrics))
    .route("/article/{slug}", web::get().to(article_preview))
    .service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health))
            .route("/health/live", web::get().to(liveness))
            .route("/health/ready", web::get().to(readiness))
            .route("/feed", web::get().to(get_feed))
            .route("/feed/trending", web::get().to(get_trending))
            .route("/articles/search", web::get().to(search_articles))
            .route("/articles/slug/{slug}", web::get().to(get_article_by_slug))
            .route("/articles", web::post().to(create_article))
            .route("/articles/{id}", web::get().to(get_article))
            .route("/articles/{id}", web::patch().to(update_article))
            .route("/articles/{id}", web::delete().to(delete_article))
            .route("/articles/{id}/views", web::post().to(record_view))
            .route("/articles/{id}/analytics", web::get().to(article_analytics))
            .route("/me/articles", web::get().to(my_articles))
            .route("/me/profile", web::get().to(my_profile))
            .service(
                web::resource("/images")
                    .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES + 1))
                    .route(web::post().to(upload_image)),
            )
            .route("/images/upload-url", web::post().to(create_upload_url))
            .route("/admin/users", web::get().to(list_users))
            .route("/admin/users/{id}/role", web::patch().to(update_role))
            .route(
                "/admin/articles/{id}/featured",
                web::patch().to(set_featured),
            ),
    );
}
