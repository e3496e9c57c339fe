use chrono::{DateTime, Utc};
use feed_ranking::{rank_feed, trending};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::Result;
use crate::metrics::feed::{FEED_CANDIDATE_COUNT, FEED_REQUEST_DURATION_SECONDS, FEED_REQUEST_TOTAL};
use crate::models::{is_all_categories, Article, Language};
use crate::store::{ArticleFilter, ArticleStore, FeedCursor};

/// Published articles considered when picking trending ones.
const TRENDING_SCAN_LIMIT: usize = 100;

/// Parameters of one feed page request.
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    /// Category name; `None`, empty or `All` means every category
    pub category: Option<String>,
    /// Reader's language; `None` keeps both languages
    pub language: Option<Language>,
    /// Keep articles tagged with any of these states; empty keeps everything
    pub states: Vec<String>,
    pub limit: Option<usize>,
    pub cursor: Option<FeedCursor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub articles: Vec<Article>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Feed assembly: fetch a bounded page from the store, filter, rank.
pub struct FeedService {
    store: Arc<dyn ArticleStore>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn ArticleStore>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// One ranked page of the published feed.
    ///
    /// Language and state filters apply after the store page is fetched, so a page may
    /// hold fewer than `limit` articles while `has_more` is still true.
    pub async fn feed_page(&self, query: FeedQuery, now: DateTime<Utc>) -> Result<FeedPage> {
        let timer = FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&["feed"])
            .start_timer();
        FEED_REQUEST_TOTAL.with_label_values(&["feed"]).inc();

        let filter = ArticleFilter {
            category: query
                .category
                .filter(|c| !is_all_categories(c))
                .map(|c| c.trim().to_string()),
            limit: self.config.clamp_limit(query.limit),
            cursor: query.cursor,
        };

        let page = self.store.fetch_published(&filter).await?;
        let has_more = page.has_more();
        let next_cursor = page.next_cursor.map(|c| c.encode());

        let candidates: Vec<Article> = page
            .items
            .into_iter()
            .filter(|a| matches_language(a, query.language))
            .filter(|a| matches_states(a, &query.states))
            .collect();

        FEED_CANDIDATE_COUNT
            .with_label_values(&["feed"])
            .observe(candidates.len() as f64);

        let articles = rank_feed(&candidates, &self.config.weights, now.timestamp_millis());

        debug!(
            category = filter.category.as_deref().unwrap_or("All"),
            limit = filter.limit,
            returned = articles.len(),
            has_more,
            "Feed page assembled"
        );

        timer.observe_duration();

        Ok(FeedPage {
            articles,
            next_cursor,
            has_more,
        })
    }

    /// Most-viewed recent articles, `count` at most.
    pub async fn trending(&self, count: Option<usize>, now: DateTime<Utc>) -> Result<Vec<Article>> {
        let timer = FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&["trending"])
            .start_timer();
        FEED_REQUEST_TOTAL.with_label_values(&["trending"]).inc();

        let count = count
            .unwrap_or(self.config.trending_count)
            .clamp(1, self.config.max_page_size.max(1));

        let page = self
            .store
            .fetch_published(&ArticleFilter {
                limit: TRENDING_SCAN_LIMIT,
                ..Default::default()
            })
            .await?;

        FEED_CANDIDATE_COUNT
            .with_label_values(&["trending"])
            .observe(page.items.len() as f64);

        let articles = trending(
            &page.items,
            self.config.trending_window_hours,
            count,
            now.timestamp_millis(),
        );

        timer.observe_duration();
        Ok(articles)
    }

    /// Title/tag search over recent articles, ranked like the feed.
    pub async fn search(
        &self,
        term: &str,
        language: Option<Language>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Article>> {
        let timer = FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&["search"])
            .start_timer();
        FEED_REQUEST_TOTAL.with_label_values(&["search"]).inc();

        let term = term.trim();
        if term.is_empty() {
            timer.observe_duration();
            return Ok(Vec::new());
        }

        let matches: Vec<Article> = self
            .store
            .search(term, self.config.search_scan_limit)
            .await?
            .into_iter()
            .filter(|a| matches_language(a, language))
            .collect();

        FEED_CANDIDATE_COUNT
            .with_label_values(&["search"])
            .observe(matches.len() as f64);

        let articles = rank_feed(&matches, &self.config.weights, now.timestamp_millis());

        debug!(term, results = articles.len(), "Search completed");
        timer.observe_duration();
        Ok(articles)
    }
}

fn matches_language(article: &Article, language: Option<Language>) -> bool {
    language.map_or(true, |lang| article.language == lang)
}

fn matches_states(article: &Article, states: &[String]) -> bool {
    states.is_empty() || article.states.iter().any(|s| states.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleStatus;
    use crate::store::InMemoryArticleStore;
    use chrono::Duration;
    use uuid::Uuid;

    fn article(
        title: &str,
        hours_old: i64,
        views: i64,
        language: Language,
        states: &[&str],
        now: DateTime<Utc>,
    ) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            summary: None,
            content: String::new(),
            cover_image_url: None,
            category: "Politics".to_string(),
            tags: vec!["news".to_string()],
            states: states.iter().map(|s| s.to_string()).collect(),
            language,
            author_id: Uuid::new_v4(),
            author_name: None,
            status: ArticleStatus::Published,
            view_count: views,
            is_featured: false,
            created_at: Some(now - Duration::hours(hours_old)),
            updated_at: None,
        }
    }

    async fn service(articles: Vec<Article>) -> FeedService {
        let store = InMemoryArticleStore::new();
        for a in articles {
            store.insert(a).await;
        }
        FeedService::new(Arc::new(store), FeedConfig::default())
    }

    #[tokio::test]
    async fn test_feed_page_filters_language_and_states() {
        let now = Utc::now();
        let svc = service(vec![
            article("Hyderabad metro", 1, 0, Language::En, &["Telangana"], now),
            article("Vizag port", 2, 0, Language::En, &["Andhra Pradesh"], now),
            article("Telugu story", 3, 0, Language::Te, &["Telangana"], now),
        ])
        .await;

        let page = svc
            .feed_page(
                FeedQuery {
                    language: Some(Language::En),
                    states: vec!["Telangana".to_string()],
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].title, "Hyderabad metro");
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_feed_page_ranks_and_pages() {
        let now = Utc::now();
        let mut featured = article("Pinned", 200, 0, Language::En, &[], now);
        featured.is_featured = true;
        let svc = service(vec![
            article("Old but viral", 30, 1_000_000, Language::En, &[], now),
            article("Fresh", 0, 0, Language::En, &[], now),
            featured,
            article("Oldest", 300, 0, Language::En, &[], now),
        ])
        .await;

        // The newest three by created_at are Fresh, Old but viral, Pinned.
        let first = svc
            .feed_page(
                FeedQuery {
                    limit: Some(3),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();

        let titles: Vec<_> = first.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Pinned", "Old but viral", "Fresh"]);
        assert!(first.has_more);

        let cursor = FeedCursor::decode(first.next_cursor.as_deref().unwrap()).unwrap();
        let second = svc
            .feed_page(
                FeedQuery {
                    limit: Some(3),
                    cursor: Some(cursor),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(second.articles.len(), 1);
        assert_eq!(second.articles[0].title, "Oldest");
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_all_category_means_no_filter() {
        let now = Utc::now();
        let mut sports = article("Match", 1, 0, Language::En, &[], now);
        sports.category = "Sports".to_string();
        let svc = service(vec![sports, article("Vote", 2, 0, Language::En, &[], now)]).await;

        let all = svc
            .feed_page(
                FeedQuery {
                    category: Some("All".to_string()),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();
        assert_eq!(all.articles.len(), 2);

        let sports_only = svc
            .feed_page(
                FeedQuery {
                    category: Some("Sports".to_string()),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();
        assert_eq!(sports_only.articles.len(), 1);
        assert_eq!(sports_only.articles[0].title, "Match");
    }

    #[tokio::test]
    async fn test_trending_window_and_order() {
        let now = Utc::now();
        let svc = service(vec![
            article("Quiet", 1, 10, Language::En, &[], now),
            article("Busy", 5, 500, Language::En, &[], now),
            article("Stale", 72, 9_999, Language::En, &[], now),
        ])
        .await;

        let top = svc.trending(Some(5), now).await.unwrap();
        let titles: Vec<_> = top.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Busy", "Quiet"]);

        let one = svc.trending(Some(1), now).await.unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn test_search_language_and_empty_term() {
        let now = Utc::now();
        let svc = service(vec![
            article("Cricket final", 1, 0, Language::En, &[], now),
            article("Cricket telugu", 2, 0, Language::Te, &[], now),
        ])
        .await;

        assert_eq!(svc.search("cricket", None, now).await.unwrap().len(), 2);
        let te = svc.search("CRICKET", Some(Language::Te), now).await.unwrap();
        assert_eq!(te.len(), 1);
        assert_eq!(te[0].title, "Cricket telugu");
        assert!(svc.search("   ", None, now).await.unwrap().is_empty());
    }
}
