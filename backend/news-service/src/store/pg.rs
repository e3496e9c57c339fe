//! PostgreSQL stores. Schema lives in `migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::{
    matches_search, ArticleFilter, ArticleStore, FeedCursor, Page, ProfileUpsert, UserStore,
};
use crate::error::Result;
use crate::models::{
    Article, ArticleStatus, ArticleUpdate, NewArticleRecord, Role, UserProfile,
};

const ARTICLE_COLUMNS: &str = r#"
    id, title, slug, summary, content, cover_image_url, category, tags, states,
    language, author_id, author_name, status, view_count, is_featured,
    created_at, updated_at
"#;

const PROFILE_COLUMNS: &str =
    "id, display_name, email, role, article_count, created_at, updated_at";

#[derive(Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn fetch_published(&self, filter: &ArticleFilter) -> Result<Page<Article>> {
        let limit = filter.limit.max(1);
        let (cursor_at, cursor_id) = match filter.cursor {
            Some(cursor) => (Some(cursor.created_at), Some(cursor.id)),
            None => (None, None),
        };

        let sql = format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM articles
            WHERE status = 'published'
              AND ($1::text IS NULL OR category = $1)
              AND ($2::timestamptz IS NULL OR (created_at, id) < ($2, $3))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#
        );

        let mut items = sqlx::query_as::<_, Article>(&sql)
            .bind(filter.category.as_deref())
            .bind(cursor_at)
            .bind(cursor_id)
            .bind((limit + 1) as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch published articles");
                e
            })?;

        let has_more = items.len() > limit;
        items.truncate(limit);

        let next_cursor = if has_more {
            items.last().and_then(FeedCursor::after)
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }

    async fn fetch_by_author(
        &self,
        author_id: Uuid,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>> {
        let sql = format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM articles
            WHERE author_id = $1
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#
        );

        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(author_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    async fn search(&self, term: &str, scan_limit: usize) -> Result<Vec<Article>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM articles
            WHERE status = 'published'
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#
        );

        let recent = sqlx::query_as::<_, Article>(&sql)
            .bind(scan_limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(recent
            .into_iter()
            .filter(|a| matches_search(a, &term))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1 LIMIT 1");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn create(&self, record: NewArticleRecord) -> Result<Article> {
        let sql = format!(
            r#"
            INSERT INTO articles (
                id, title, slug, summary, content, cover_image_url, category, tags, states,
                language, author_id, author_name, status, view_count, is_featured,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 0, FALSE, NOW(), NOW())
            RETURNING {ARTICLE_COLUMNS}
            "#
        );

        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(Uuid::new_v4())
            .bind(&record.title)
            .bind(&record.slug)
            .bind(&record.summary)
            .bind(&record.content)
            .bind(&record.cover_image_url)
            .bind(&record.category)
            .bind(&record.tags)
            .bind(&record.states)
            .bind(record.language.as_str())
            .bind(record.author_id)
            .bind(&record.author_name)
            .bind(record.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(article)
    }

    async fn update(&self, id: Uuid, changes: &ArticleUpdate) -> Result<Option<Article>> {
        let sql = format!(
            r#"
            UPDATE articles SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                summary = COALESCE($4, summary),
                content = COALESCE($5, content),
                cover_image_url = COALESCE($6, cover_image_url),
                category = COALESCE($7, category),
                tags = COALESCE($8, tags),
                states = COALESCE($9, states),
                language = COALESCE($10, language),
                status = COALESCE($11, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ARTICLE_COLUMNS}
            "#
        );

        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.summary)
            .bind(&changes.content)
            .bind(&changes.cover_image_url)
            .bind(&changes.category)
            .bind(&changes.tags)
            .bind(&changes.states)
            .bind(changes.language.map(|l| l.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?;

        Ok(article)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Article>> {
        let sql = format!("DELETE FROM articles WHERE id = $1 RETURNING {ARTICLE_COLUMNS}");
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE articles SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE articles SET is_featured = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(featured)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<UserProfile> {
        let sql = format!(
            r#"
            INSERT INTO users (id, display_name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET display_name = EXCLUDED.display_name,
                    email = EXCLUDED.email,
                    updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(profile.id)
            .bind(&profile.display_name)
            .bind(&profile.email)
            .bind(profile.initial_role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users ORDER BY created_at ASC");
        let profiles = sqlx::query_as::<_, UserProfile>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<UserProfile>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn adjust_article_count(&self, id: Uuid, delta: i64) -> Result<()> {
        sqlx::query(
            "UPDATE users SET article_count = GREATEST(article_count + $2, 0) WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
