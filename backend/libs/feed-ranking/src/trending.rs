use crate::ranker::Rankable;
use crate::scoring::MILLIS_PER_HOUR;

pub const DEFAULT_TRENDING_WINDOW_HOURS: f64 = 48.0;

/// Most-viewed articles created within the last `window_hours`.
///
/// Articles without a creation time are never trending. Ties on view count
/// keep input order. Featured status is ignored here.
pub fn trending<T: Rankable + Clone>(
    articles: &[T],
    window_hours: f64,
    count: usize,
    now_millis: i64,
) -> Vec<T> {
    let window_millis = window_hours * MILLIS_PER_HOUR;

    let mut recent: Vec<&T> = articles
        .iter()
        .filter(|article| match article.created_at_millis() {
            Some(created_at) => (now_millis.saturating_sub(created_at) as f64) < window_millis,
            None => false,
        })
        .collect();

    recent.sort_by(|a, b| {
        let a = a.view_count().unwrap_or(0);
        let b = b.view_count().unwrap_or(0);
        b.cmp(&a)
    });

    recent.into_iter().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000;
    const NOW: i64 = 1_750_000_000_000;

    #[derive(Debug, Clone)]
    struct Story {
        id: u32,
        created_at: Option<i64>,
        views: Option<i64>,
    }

    impl Rankable for Story {
        fn created_at_millis(&self) -> Option<i64> {
            self.created_at
        }

        fn view_count(&self) -> Option<i64> {
            self.views
        }

        fn is_featured(&self) -> bool {
            false
        }
    }

    fn story(id: u32, age_hours: i64, views: i64) -> Story {
        Story {
            id,
            created_at: Some(NOW - age_hours * HOUR),
            views: Some(views),
        }
    }

    #[test]
    fn test_trending_orders_by_views_within_window() {
        let stories = vec![story(1, 2, 10), story(2, 10, 500), story(3, 47, 90)];
        let top: Vec<u32> = trending(&stories, 48.0, 5, NOW).iter().map(|s| s.id).collect();
        assert_eq!(top, vec![2, 3, 1]);
    }

    #[test]
    fn test_trending_excludes_old_and_undated() {
        let stories = vec![
            story(1, 48, 10_000),
            story(2, 1, 3),
            Story {
                id: 3,
                created_at: None,
                views: Some(99_999),
            },
        ];
        let top: Vec<u32> = trending(&stories, 48.0, 5, NOW).iter().map(|s| s.id).collect();
        assert_eq!(top, vec![2]);
    }

    #[test]
    fn test_trending_respects_count() {
        let stories: Vec<Story> = (0..10).map(|i| story(i, 1, i as i64)).collect();
        let top = trending(&stories, 48.0, 3, NOW);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].id, 9);
    }

    #[test]
    fn test_trending_empty() {
        let stories: Vec<Story> = Vec::new();
        assert!(trending(&stories, 48.0, 5, NOW).is_empty());
    }
}
