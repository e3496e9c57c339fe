//! In-memory stores backed by `tokio::sync::RwLock`.
//!
//! Same contract as the PostgreSQL stores. Timestamps are truncated to microseconds so
//! cursors behave exactly as they do against `TIMESTAMPTZ` columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    matches_search, ArticleFilter, ArticleStore, FeedCursor, Page, ProfileUpsert, UserStore,
};
use crate::error::{AppError, Result};
use crate::models::{
    Article, ArticleStatus, ArticleUpdate, NewArticleRecord, Role, UserProfile,
};

fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

fn feed_key(article: &Article) -> (DateTime<Utc>, Uuid) {
    (
        article.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
        article.id,
    )
}

fn newest_first(articles: &mut [Article]) {
    articles.sort_by_key(|a| Reverse(feed_key(a)));
}

#[derive(Default)]
pub struct InMemoryArticleStore {
    articles: RwLock<HashMap<Uuid, Article>>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed article (fixtures, imports). Missing timestamps are set to
    /// now, as the database column defaults do, so every stored article has a feed key.
    pub async fn insert(&self, mut article: Article) {
        let now = now_micros();
        article.created_at.get_or_insert(now);
        article.updated_at.get_or_insert(now);
        self.articles.write().await.insert(article.id, article);
    }

    async fn published_newest_first(&self) -> Vec<Article> {
        let articles = self.articles.read().await;
        let mut published: Vec<Article> = articles
            .values()
            .filter(|a| a.is_published())
            .cloned()
            .collect();
        newest_first(&mut published);
        published
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn fetch_published(&self, filter: &ArticleFilter) -> Result<Page<Article>> {
        let limit = filter.limit.max(1);

        let mut matching: Vec<Article> = self
            .published_newest_first()
            .await
            .into_iter()
            .filter(|a| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |category| a.category == category)
            })
            .filter(|a| {
                filter.cursor.map_or(true, |cursor| {
                    let (created_at, id) = feed_key(a);
                    cursor.precedes(created_at, id)
                })
            })
            .take(limit + 1)
            .collect();

        let has_more = matching.len() > limit;
        matching.truncate(limit);

        let next_cursor = if has_more {
            matching.last().and_then(FeedCursor::after)
        } else {
            None
        };

        Ok(Page {
            items: matching,
            next_cursor,
        })
    }

    async fn fetch_by_author(
        &self,
        author_id: Uuid,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut mine: Vec<Article> = articles
            .values()
            .filter(|a| a.author_id == author_id)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        newest_first(&mut mine);
        Ok(mine)
    }

    async fn search(&self, term: &str, scan_limit: usize) -> Result<Vec<Article>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .published_newest_first()
            .await
            .into_iter()
            .take(scan_limit)
            .filter(|a| matches_search(a, &term))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.articles.read().await.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        Ok(self
            .articles
            .read()
            .await
            .values()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn create(&self, record: NewArticleRecord) -> Result<Article> {
        let mut articles = self.articles.write().await;

        if articles.values().any(|a| a.slug == record.slug) {
            return Err(AppError::Conflict(
                "An article with this slug already exists".to_string(),
            ));
        }

        let now = now_micros();
        let article = Article {
            id: Uuid::new_v4(),
            title: record.title,
            slug: record.slug,
            summary: record.summary,
            content: record.content,
            cover_image_url: record.cover_image_url,
            category: record.category,
            tags: record.tags,
            states: record.states,
            language: record.language,
            author_id: record.author_id,
            author_name: record.author_name,
            status: record.status,
            view_count: 0,
            is_featured: false,
            created_at: Some(now),
            updated_at: Some(now),
        };

        articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update(&self, id: Uuid, changes: &ArticleUpdate) -> Result<Option<Article>> {
        let mut articles = self.articles.write().await;

        if let Some(slug) = &changes.slug {
            if articles.values().any(|a| a.id != id && &a.slug == slug) {
                return Err(AppError::Conflict(
                    "An article with this slug already exists".to_string(),
                ));
            }
        }

        let Some(article) = articles.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(article);
        article.updated_at = Some(now_micros());
        Ok(Some(article.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.articles.write().await.remove(&id))
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<bool> {
        match self.articles.write().await.get_mut(&id) {
            Some(article) => {
                article.view_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<bool> {
        match self.articles.write().await.get_mut(&id) {
            Some(article) => {
                article.is_featured = featured;
                article.updated_at = Some(now_micros());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn upsert_profile(&self, profile: ProfileUpsert) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        let now = now_micros();

        let entry = users.entry(profile.id).or_insert_with(|| UserProfile {
            id: profile.id,
            display_name: String::new(),
            email: None,
            role: profile.initial_role,
            article_count: 0,
            created_at: now,
            updated_at: now,
        });

        entry.display_name = profile.display_name;
        entry.email = profile.email;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self.users.read().await.values().cloned().collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<UserProfile>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|profile| {
            profile.role = role;
            profile.updated_at = now_micros();
            profile.clone()
        }))
    }

    async fn adjust_article_count(&self, id: Uuid, delta: i64) -> Result<()> {
        if let Some(profile) = self.users.write().await.get_mut(&id) {
            profile.article_count = (profile.article_count + delta).max(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use chrono::Duration;

    fn record(slug: &str, status: ArticleStatus) -> NewArticleRecord {
        NewArticleRecord {
            title: format!("Title {slug}"),
            slug: slug.to_string(),
            summary: None,
            content: "<p>body</p>".to_string(),
            cover_image_url: None,
            category: "Politics".to_string(),
            tags: vec!["assembly".to_string()],
            states: vec!["Telangana".to_string()],
            language: Language::En,
            author_id: Uuid::from_u128(7),
            author_name: Some("Desk".to_string()),
            status,
        }
    }

    async fn seed(store: &InMemoryArticleStore, count: usize) -> Vec<Article> {
        let base = now_micros();
        let mut seeded = Vec::new();
        for i in 0..count {
            let mut article = store
                .create(record(&format!("story-{i}"), ArticleStatus::Published))
                .await
                .unwrap();
            article.created_at = Some(base - Duration::minutes(i as i64));
            store.insert(article.clone()).await;
            seeded.push(article);
        }
        seeded
    }

    #[tokio::test]
    async fn test_create_assigns_server_fields() {
        let store = InMemoryArticleStore::new();
        let article = store.create(record("a", ArticleStatus::Draft)).await.unwrap();

        assert_eq!(article.view_count, 0);
        assert!(!article.is_featured);
        assert!(article.created_at.is_some());
        assert_eq!(store.get(article.id).await.unwrap(), Some(article));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = InMemoryArticleStore::new();
        store.create(record("same", ArticleStatus::Draft)).await.unwrap();
        let err = store.create(record("same", ArticleStatus::Draft)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_pages_do_not_overlap_and_end() {
        let store = InMemoryArticleStore::new();
        let seeded = seed(&store, 5).await;

        let mut filter = ArticleFilter {
            category: None,
            limit: 2,
            cursor: None,
        };
        let mut seen = Vec::new();
        loop {
            let page = store.fetch_published(&filter).await.unwrap();
            assert!(page.items.len() <= 2);
            seen.extend(page.items.iter().map(|a| a.id));
            match page.next_cursor {
                Some(cursor) => filter.cursor = Some(cursor),
                None => break,
            }
        }

        let expected: Vec<Uuid> = seeded.iter().map(|a| a.id).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_undated_imports_stay_reachable() {
        let store = InMemoryArticleStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let mut article = store
                .create(record(&format!("import-{i}"), ArticleStatus::Published))
                .await
                .unwrap();
            article.created_at = None;
            article.updated_at = None;
            store.insert(article.clone()).await;
            ids.push(article.id);
        }

        let mut filter = ArticleFilter {
            limit: 1,
            ..Default::default()
        };
        let mut seen = Vec::new();
        loop {
            let page = store.fetch_published(&filter).await.unwrap();
            assert!(page.items.iter().all(|a| a.created_at.is_some()));
            seen.extend(page.items.iter().map(|a| a.id));
            match page.next_cursor {
                Some(cursor) => filter.cursor = Some(cursor),
                None => break,
            }
        }

        seen.sort();
        ids.sort();
        assert_eq!(seen, ids);
    }

    #[tokio::test]
    async fn test_same_cursor_same_page() {
        let store = InMemoryArticleStore::new();
        seed(&store, 4).await;

        let first = store
            .fetch_published(&ArticleFilter {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        let filter = ArticleFilter {
            limit: 2,
            cursor: first.next_cursor,
            ..Default::default()
        };

        let a = store.fetch_published(&filter).await.unwrap();
        let b = store.fetch_published(&filter).await.unwrap();
        assert_eq!(a.items, b.items);
        assert!(a.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_drafts_are_not_in_feed() {
        let store = InMemoryArticleStore::new();
        store.create(record("draft", ArticleStatus::Draft)).await.unwrap();
        let page = store
            .fetch_published(&ArticleFilter {
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_search_and_empty_term() {
        let store = InMemoryArticleStore::new();
        seed(&store, 3).await;

        assert_eq!(store.search("ASSEMBLY", 50).await.unwrap().len(), 3);
        assert_eq!(store.search("story-1", 50).await.unwrap().len(), 1);
        assert!(store.search("   ", 50).await.unwrap().is_empty());
        assert_eq!(store.search("title", 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_views_featured_and_delete() {
        let store = InMemoryArticleStore::new();
        let article = store.create(record("v", ArticleStatus::Published)).await.unwrap();

        assert!(store.increment_view_count(article.id).await.unwrap());
        assert!(store.increment_view_count(article.id).await.unwrap());
        assert!(store.set_featured(article.id, true).await.unwrap());
        assert!(!store.increment_view_count(Uuid::new_v4()).await.unwrap());

        let removed = store.delete(article.id).await.unwrap().unwrap();
        assert_eq!(removed.view_count, 2);
        assert!(removed.is_featured);
        assert!(store.get(article.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_store_count_never_negative() {
        let users = InMemoryUserStore::new();
        let id = Uuid::new_v4();
        users
            .upsert_profile(ProfileUpsert {
                id,
                display_name: "Reporter".to_string(),
                email: None,
                initial_role: Role::Creator,
            })
            .await
            .unwrap();

        users.adjust_article_count(id, 1).await.unwrap();
        users.adjust_article_count(id, -3).await.unwrap();
        assert_eq!(users.get_profile(id).await.unwrap().unwrap().article_count, 0);

        let updated = users.update_role(id, Role::Admin).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);

        let again = users
            .upsert_profile(ProfileUpsert {
                id,
                display_name: "Senior Reporter".to_string(),
                email: None,
                initial_role: Role::Viewer,
            })
            .await
            .unwrap();
        assert_eq!(again.role, Role::Admin);
        assert_eq!(again.display_name, "Senior Reporter");
    }
}
