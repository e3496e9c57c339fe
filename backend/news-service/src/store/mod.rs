//! Article and user persistence.
//!
//! The feed only ever sees a bounded, newest-first page of published articles from
//! [`ArticleStore::fetch_published`]; ranking happens afterwards, in memory.
//! Two implementations share the contract: PostgreSQL for deployments and an
//! in-memory store for tests and local runs.

pub mod cursor;
pub mod memory;
pub mod pg;

pub use cursor::FeedCursor;
pub use memory::{InMemoryArticleStore, InMemoryUserStore};
pub use pg::{PgArticleStore, PgUserStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Article, ArticleStatus, ArticleUpdate, NewArticleRecord, Role, UserProfile,
};

/// Query for one page of the published feed.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Exact category; `None` for every category
    pub category: Option<String>,
    pub limit: usize,
    pub cursor: Option<FeedCursor>,
}

/// One page of results plus the position to continue from.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `Some` only when more items exist past this page
    pub next_cursor: Option<FeedCursor>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Published articles, newest first, at most `filter.limit`.
    async fn fetch_published(&self, filter: &ArticleFilter) -> Result<Page<Article>>;

    /// Every article by `author_id` (any status unless filtered), newest first.
    async fn fetch_by_author(
        &self,
        author_id: Uuid,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>>;

    /// Case-insensitive substring match on title or tags over the newest
    /// `scan_limit` published articles.
    async fn search(&self, term: &str, scan_limit: usize) -> Result<Vec<Article>>;

    async fn get(&self, id: Uuid) -> Result<Option<Article>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Insert with server-assigned id and timestamps, zero views and not featured.
    async fn create(&self, record: NewArticleRecord) -> Result<Article>;

    async fn update(&self, id: Uuid, changes: &ArticleUpdate) -> Result<Option<Article>>;

    /// Remove and return the deleted record.
    async fn delete(&self, id: Uuid) -> Result<Option<Article>>;

    /// Atomically add one view. `false` when the article does not exist.
    async fn increment_view_count(&self, id: Uuid) -> Result<bool>;

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<bool>;
}

/// Profile fields supplied by the identity provider.
#[derive(Debug, Clone)]
pub struct ProfileUpsert {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    /// Role for a newly created profile; existing roles are never overwritten here
    pub initial_role: Role,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<UserProfile>;

    async fn list_profiles(&self) -> Result<Vec<UserProfile>>;

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<UserProfile>>;

    /// Add `delta` to the published-article count, never going below zero.
    async fn adjust_article_count(&self, id: Uuid, delta: i64) -> Result<()>;
}

/// Search predicate shared by every store. `term_lower` must already be lowercase.
pub(crate) fn matches_search(article: &Article, term_lower: &str) -> bool {
    article.title.to_lowercase().contains(term_lower)
        || article
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(term_lower))
}
