/// Article service - authoring, lifecycle and per-article statistics
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::content::{embed_videos, unique_slug};
use crate::error::{AppError, Result};
use crate::media::{extract_image_urls, BlobStore};
use crate::metrics::feed::ARTICLE_VIEWS_TOTAL;
use crate::models::{
    Article, ArticleAnalytics, ArticleStatus, ArticleUpdate, NewArticle, NewArticleRecord,
};
use crate::store::{ArticleStore, UserStore};

pub struct ArticleService {
    articles: Arc<dyn ArticleStore>,
    users: Arc<dyn UserStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        users: Arc<dyn UserStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            articles,
            users,
            blobs,
        }
    }

    /// Create an article authored by `actor` (creators and admins only).
    pub async fn create(&self, actor: &Actor, request: NewArticle) -> Result<Article> {
        if !actor.role.is_creator() {
            return Err(AppError::Forbidden(
                "Only creators can publish articles".to_string(),
            ));
        }
        request.validate()?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title must not be blank".to_string()));
        }

        let record = NewArticleRecord {
            slug: unique_slug(&title, Utc::now()),
            title,
            summary: request.summary.filter(|s| !s.trim().is_empty()),
            content: embed_videos(&request.content),
            cover_image_url: request.cover_image_url.filter(|u| !u.trim().is_empty()),
            category: request.category,
            tags: clean_tags(request.tags),
            states: request.states,
            language: request.language,
            author_id: actor.id,
            author_name: actor.display_name.clone(),
            status: request.status,
        };

        let article = self.articles.create(record).await?;
        info!(article_id = %article.id, author_id = %actor.id, status = %article.status, "Article created");

        if article.is_published() {
            self.adjust_count(article.author_id, 1).await;
        }
        Ok(article)
    }

    /// Apply a partial update (author or admin).
    ///
    /// A title change re-slugs the article only while it is still a draft, so published
    /// links keep working.
    pub async fn update(&self, actor: &Actor, id: Uuid, mut changes: ArticleUpdate) -> Result<Article> {
        changes.validate()?;

        let existing = self.require(id).await?;
        ensure_can_edit(actor, &existing)?;

        if changes.is_empty() {
            return Ok(existing);
        }

        if let Some(title) = changes.title.take() {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("Title must not be blank".to_string()));
            }
            if title != existing.title && existing.status == ArticleStatus::Draft {
                changes.slug = Some(unique_slug(&title, Utc::now()));
            }
            changes.title = Some(title);
        }
        if let Some(content) = changes.content.take() {
            changes.content = Some(embed_videos(&content));
        }
        if let Some(tags) = changes.tags.take() {
            changes.tags = Some(clean_tags(tags));
        }

        let updated = self
            .articles
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))?;

        match (existing.is_published(), updated.is_published()) {
            (false, true) => self.adjust_count(updated.author_id, 1).await,
            (true, false) => self.adjust_count(updated.author_id, -1).await,
            _ => {}
        }

        info!(article_id = %id, actor_id = %actor.id, "Article updated");
        Ok(updated)
    }

    /// Delete an article and the images it references (author or admin).
    ///
    /// Images are removed first; a failed blob delete is logged and never blocks
    /// removing the record.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let existing = self.require(id).await?;
        ensure_can_edit(actor, &existing)?;

        self.delete_images(&existing).await;

        let removed = self
            .articles
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))?;

        if removed.is_published() {
            self.adjust_count(removed.author_id, -1).await;
        }

        info!(article_id = %id, actor_id = %actor.id, "Article deleted");
        Ok(())
    }

    /// Article by id. Unpublished articles are only visible to their author and admins.
    pub async fn get(&self, id: Uuid, viewer: Option<&Actor>) -> Result<Article> {
        let article = self.require(id).await?;
        visible_to(article, viewer)
    }

    pub async fn get_by_slug(&self, slug: &str, viewer: Option<&Actor>) -> Result<Article> {
        let article = self
            .articles
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article '{}' not found", slug)))?;
        visible_to(article, viewer)
    }

    /// Published article for link previews; `None` for drafts and unknown slugs.
    pub async fn published_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        Ok(self
            .articles
            .get_by_slug(slug)
            .await?
            .filter(Article::is_published))
    }

    pub async fn record_view(&self, id: Uuid) -> Result<()> {
        if !self.articles.increment_view_count(id).await? {
            return Err(AppError::NotFound(format!("Article {} not found", id)));
        }
        ARTICLE_VIEWS_TOTAL.inc();
        Ok(())
    }

    pub async fn analytics(&self, actor: &Actor, id: Uuid) -> Result<ArticleAnalytics> {
        let article = self.require(id).await?;
        ensure_can_edit(actor, &article)?;
        Ok(ArticleAnalytics::from(&article))
    }

    pub async fn set_featured(&self, actor: &Actor, id: Uuid, featured: bool) -> Result<Article> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can feature articles".to_string(),
            ));
        }

        if !self.articles.set_featured(id, featured).await? {
            return Err(AppError::NotFound(format!("Article {} not found", id)));
        }

        info!(article_id = %id, featured, "Article featured flag changed");
        self.require(id).await
    }

    /// The actor's own articles, newest first.
    pub async fn my_articles(
        &self,
        actor: &Actor,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>> {
        self.articles.fetch_by_author(actor.id, status).await
    }

    async fn require(&self, id: Uuid) -> Result<Article> {
        self.articles
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))
    }

    async fn delete_images(&self, article: &Article) {
        let mut urls = extract_image_urls(&article.content);
        if let Some(cover) = &article.cover_image_url {
            urls.insert(0, cover.clone());
        }

        let mut paths: Vec<String> = urls
            .iter()
            .filter_map(|url| self.blobs.blob_path_from_url(url))
            .collect();
        paths.sort();
        paths.dedup();

        for path in paths {
            if let Err(e) = self.blobs.delete(&path).await {
                warn!(article_id = %article.id, path = %path, error = %e, "Failed to delete article image");
            }
        }
    }

    async fn adjust_count(&self, author_id: Uuid, delta: i64) {
        if let Err(e) = self.users.adjust_article_count(author_id, delta).await {
            warn!(author_id = %author_id, delta, error = %e, "Failed to adjust article count");
        }
    }
}

fn ensure_can_edit(actor: &Actor, article: &Article) -> Result<()> {
    if actor.id == article.author_id || actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author or an admin can modify this article".to_string(),
        ))
    }
}

fn visible_to(article: Article, viewer: Option<&Actor>) -> Result<Article> {
    let allowed = article.is_published()
        || viewer.map_or(false, |v| v.id == article.author_id || v.role.is_admin());

    if allowed {
        Ok(article)
    } else {
        Err(AppError::NotFound(format!("Article {} not found", article.id)))
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}
