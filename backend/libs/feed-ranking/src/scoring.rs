//! Per-article scoring.
//!
//! score = recency * freshness_weight + engagement * view_count_weight
//!
//! - recency: `exp(-age_hours / recency_decay_hours)`, 1.0 for a brand new article,
//!   0.0 when the creation time is unknown.
//! - engagement: `log10(view_count + 1)`, so a viral article cannot dominate forever.

use crate::ranker::Rankable;
use crate::weights::FeedWeights;

pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Recency component in `[0, 1]`.
///
/// Timestamps in the future (clock skew between writers) count as age 0.
pub fn recency_score(created_at_millis: Option<i64>, now_millis: i64, decay_hours: f64) -> f64 {
    let Some(created_at) = created_at_millis else {
        return 0.0;
    };

    let age_hours = (now_millis.saturating_sub(created_at) as f64 / MILLIS_PER_HOUR).max(0.0);
    (-age_hours / decay_hours).exp()
}

/// Engagement component; missing and negative counts score 0.
pub fn engagement_score(view_count: Option<i64>) -> f64 {
    let views = view_count.unwrap_or(0).max(0) as f64;
    (views + 1.0).log10()
}

/// Final blended score for a regular (non-featured) article.
pub fn ranking_score<T: Rankable + ?Sized>(item: &T, weights: &FeedWeights, now_millis: i64) -> f64 {
    let recency = recency_score(
        item.created_at_millis(),
        now_millis,
        weights.recency_decay_hours,
    );
    let engagement = engagement_score(item.view_count());

    recency * weights.freshness_weight + engagement * weights.view_count_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3_600_000;
    const NOW: i64 = 1_750_000_000_000;

    struct Item {
        created_at: Option<i64>,
        views: Option<i64>,
    }

    impl Rankable for Item {
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

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_recency_is_one_at_age_zero() {
        assert_eq!(recency_score(Some(NOW), NOW, 48.0), 1.0);
    }

    #[test]
    fn test_recency_is_one_over_e_at_decay_constant() {
        let score = recency_score(Some(NOW - 48 * HOUR), NOW, 48.0);
        assert!(approx(score, 0.3679), "got {score}");
    }

    #[test]
    fn test_recency_is_not_a_half_life() {
        let score = recency_score(Some(NOW - 48 * HOUR), NOW, 48.0);
        assert!((score - 0.5).abs() > 0.1);
    }

    #[test]
    fn test_recency_missing_timestamp_is_zero() {
        assert_eq!(recency_score(None, NOW, 48.0), 0.0);
    }

    #[test]
    fn test_recency_future_timestamp_clamped() {
        assert_eq!(recency_score(Some(NOW + 5 * HOUR), NOW, 48.0), 1.0);
    }

    #[test]
    fn test_recency_decays_monotonically() {
        let s1 = recency_score(Some(NOW - HOUR), NOW, 48.0);
        let s24 = recency_score(Some(NOW - 24 * HOUR), NOW, 48.0);
        let s96 = recency_score(Some(NOW - 96 * HOUR), NOW, 48.0);
        assert!(s1 > s24);
        assert!(s24 > s96);
        assert!(s96 > 0.0);
    }

    #[test]
    fn test_engagement_is_log10() {
        assert_eq!(engagement_score(Some(0)), 0.0);
        assert!(approx(engagement_score(Some(9)), 1.0));
        assert!(approx(engagement_score(Some(999_999)), 6.0));
    }

    #[test]
    fn test_engagement_missing_or_negative_is_zero() {
        assert_eq!(engagement_score(None), 0.0);
        assert_eq!(engagement_score(Some(-42)), 0.0);
    }

    #[test]
    fn test_ranking_score_default_weights() {
        let weights = FeedWeights::default();
        let fresh = Item {
            created_at: Some(NOW),
            views: Some(0),
        };
        let day_two = Item {
            created_at: Some(NOW - 48 * HOUR),
            views: Some(0),
        };

        assert!(approx(ranking_score(&fresh, &weights, NOW), 0.7));
        assert!(approx(ranking_score(&day_two, &weights, NOW), 0.2575));
    }

    #[test]
    fn test_ranking_score_empty_record() {
        let empty = Item {
            created_at: None,
            views: None,
        };
        assert_eq!(ranking_score(&empty, &FeedWeights::default(), NOW), 0.0);
    }
}
