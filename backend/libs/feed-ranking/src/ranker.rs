//! Two-tier feed ordering: curated tier first, algorithmic tier second.

use chrono::Utc;
use tracing::debug;

use crate::scoring::ranking_score;
use crate::weights::FeedWeights;

/// Fields the ranker reads from an article. Everything else is passed through untouched.
pub trait Rankable {
    /// Creation time as epoch milliseconds, `None` when unknown.
    fn created_at_millis(&self) -> Option<i64>;

    /// Lifetime view count, `None` when missing.
    fn view_count(&self) -> Option<i64>;

    /// Editorially pinned articles bypass scoring.
    fn is_featured(&self) -> bool;
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn created_at_millis(&self) -> Option<i64> {
        (**self).created_at_millis()
    }

    fn view_count(&self) -> Option<i64> {
        (**self).view_count()
    }

    fn is_featured(&self) -> bool {
        (**self).is_featured()
    }
}

/// A ranked article plus its diagnostic score.
///
/// `score` is `None` for featured articles, which are never scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: Option<f64>,
}

impl<T> Ranked<T> {
    pub fn into_inner(self) -> T {
        self.item
    }
}

/// Rank a feed snapshot, keeping the computed scores.
///
/// Output order:
/// 1. featured articles, in input order;
/// 2. regular articles by descending score, ties kept in input order.
///
/// Every input article appears exactly once.
pub fn rank_feed_scored<T: Rankable>(
    articles: Vec<T>,
    weights: &FeedWeights,
    now_millis: i64,
) -> Vec<Ranked<T>> {
    if articles.is_empty() {
        return Vec::new();
    }

    let weights = weights.sanitized();
    let total = articles.len();

    let (featured, regular): (Vec<T>, Vec<T>) =
        articles.into_iter().partition(|article| article.is_featured());

    let mut scored: Vec<Ranked<T>> = regular
        .into_iter()
        .map(|item| {
            let score = ranking_score(&item, &weights, now_millis);
            Ranked {
                item,
                score: Some(score),
            }
        })
        .collect();

    // Vec::sort_by is stable, so equal scores keep their input order.
    scored.sort_by(|a, b| {
        let a = a.score.unwrap_or(0.0);
        let b = b.score.unwrap_or(0.0);
        b.total_cmp(&a)
    });

    debug!(
        total,
        featured = featured.len(),
        regular = scored.len(),
        "Ranked feed snapshot"
    );

    let mut ranked = Vec::with_capacity(total);
    ranked.extend(featured.into_iter().map(|item| Ranked { item, score: None }));
    ranked.extend(scored);
    ranked
}

/// Rank a feed snapshot. The input slice is left untouched.
pub fn rank_feed<T: Rankable + Clone>(
    articles: &[T],
    weights: &FeedWeights,
    now_millis: i64,
) -> Vec<T> {
    rank_feed_scored(articles.to_vec(), weights, now_millis)
        .into_iter()
        .map(Ranked::into_inner)
        .collect()
}

/// [`rank_feed`] against the wall clock.
pub fn rank_feed_now<T: Rankable + Clone>(articles: &[T], weights: &FeedWeights) -> Vec<T> {
    rank_feed(articles, weights, Utc::now().timestamp_millis())
}
