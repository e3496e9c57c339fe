//! Ranking properties and reference scenarios.
//!
//! Coverage:
//! - Determinism, count preservation, featured-first ordering over randomized snapshots
//! - Monotonic recency and engagement between otherwise identical articles
//! - Missing-field tolerance
//! - Reference scenarios: empty input, single featured, decay check, engagement dominance

use feed_ranking::{rank_feed, rank_feed_scored, FeedWeights, Rankable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const HOUR: i64 = 3_600_000;
const NOW: i64 = 1_750_000_000_000;

#[derive(Debug, Clone, PartialEq)]
struct Article {
    id: String,
    created_at: Option<i64>,
    view_count: Option<i64>,
    is_featured: bool,
    title: String,
}

impl Rankable for Article {
    fn created_at_millis(&self) -> Option<i64> {
        self.created_at
    }

    fn view_count(&self) -> Option<i64> {
        self.view_count
    }

    fn is_featured(&self) -> bool {
        self.is_featured
    }
}

fn article(id: &str, created_at: Option<i64>, view_count: Option<i64>, featured: bool) -> Article {
    Article {
        id: id.to_string(),
        created_at,
        view_count,
        is_featured: featured,
        title: format!("Title {id}"),
    }
}

fn random_snapshot(rng: &mut StdRng, len: usize) -> Vec<Article> {
    (0..len)
        .map(|i| {
            let created_at = if rng.gen_bool(0.1) {
                None
            } else {
                Some(NOW - rng.gen_range(0..2_000) * HOUR)
            };
            let view_count = if rng.gen_bool(0.1) {
                None
            } else {
                Some(rng.gen_range(0..100_000))
            };
            article(&format!("a{i}"), created_at, view_count, rng.gen_bool(0.2))
        })
        .collect()
}

fn ids(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn test_ranking_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let weights = FeedWeights::default();

    for len in [0, 1, 5, 40, 300] {
        let snapshot = random_snapshot(&mut rng, len);
        let first = rank_feed(&snapshot, &weights, NOW);
        let second = rank_feed(&snapshot, &weights, NOW);
        assert_eq!(first, second);
    }
}

#[test]
fn test_output_is_a_permutation_of_input() {
    let mut rng = StdRng::seed_from_u64(11);
    let weights = FeedWeights::default();

    for _ in 0..25 {
        let len = rng.gen_range(0..200);
        let snapshot = random_snapshot(&mut rng, len);
        let ranked = rank_feed(&snapshot, &weights, NOW);

        assert_eq!(ranked.len(), snapshot.len());
        let input_ids: HashSet<&str> = snapshot.iter().map(|a| a.id.as_str()).collect();
        let output_ids: HashSet<&str> = ranked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(input_ids, output_ids);
        assert_eq!(output_ids.len(), ranked.len(), "an article appeared twice");
    }
}

#[test]
fn test_featured_always_precede_regular() {
    let mut rng = StdRng::seed_from_u64(23);
    let weights = FeedWeights::default();

    for _ in 0..25 {
        let snapshot = random_snapshot(&mut rng, 120);
        let ranked = rank_feed(&snapshot, &weights, NOW);

        let first_regular = ranked.iter().position(|a| !a.is_featured).unwrap_or(ranked.len());
        assert!(ranked[first_regular..].iter().all(|a| !a.is_featured));

        // Featured tier keeps input order.
        let featured_in: Vec<&str> = snapshot
            .iter()
            .filter(|a| a.is_featured)
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids(&ranked[..first_regular]), featured_in);
    }
}

#[test]
fn test_regular_scores_are_non_increasing() {
    let mut rng = StdRng::seed_from_u64(31);
    let snapshot = random_snapshot(&mut rng, 250);
    let ranked = rank_feed_scored(snapshot, &FeedWeights::default(), NOW);

    let scores: Vec<f64> = ranked.iter().filter_map(|r| r.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_newer_article_ranks_at_or_above_older() {
    let older = article("older", Some(NOW - 30 * HOUR), Some(40), false);
    let newer = article("newer", Some(NOW - 2 * HOUR), Some(40), false);

    let ranked = rank_feed(&[older, newer], &FeedWeights::default(), NOW);
    assert_eq!(ids(&ranked), vec!["newer", "older"]);
}

#[test]
fn test_more_viewed_article_ranks_at_or_above_less_viewed() {
    let created = Some(NOW - 6 * HOUR);
    let quiet = article("quiet", created, Some(3), false);
    let busy = article("busy", created, Some(3_000), false);

    let ranked = rank_feed(&[quiet, busy], &FeedWeights::default(), NOW);
    assert_eq!(ids(&ranked), vec!["busy", "quiet"]);
}

#[test]
fn test_missing_fields_sink_below_dated_articles() {
    let bare = article("bare", None, None, false);
    let dated = article("dated", Some(NOW - 500 * HOUR), Some(0), false);
    let fresh = article("fresh", Some(NOW), None, false);

    let ranked = rank_feed(&[bare, dated, fresh], &FeedWeights::default(), NOW);
    assert_eq!(ids(&ranked), vec!["fresh", "dated", "bare"]);
}

#[test]
fn test_payload_passes_through_unchanged() {
    let mut original = article("x", Some(NOW), Some(1), false);
    original.title = "Budget session opens in Amaravati".to_string();

    let ranked = rank_feed(&[original.clone()], &FeedWeights::default(), NOW);
    assert_eq!(ranked, vec![original]);
}

#[test]
fn test_scenario_empty_input() {
    let ranked: Vec<Article> = rank_feed(&[], &FeedWeights::default(), NOW);
    assert!(ranked.is_empty());
}

#[test]
fn test_scenario_single_featured_among_many() {
    let mut input: Vec<Article> = (1..=5)
        .map(|views| article(&format!("v{views}"), Some(NOW), Some(views), false))
        .collect();
    input.push(article("featured", Some(NOW - 10_000 * HOUR), Some(0), true));

    let ranked = rank_feed(&input, &FeedWeights::default(), NOW);
    assert_eq!(ids(&ranked), vec!["featured", "v5", "v4", "v3", "v2", "v1"]);
}

#[test]
fn test_scenario_decay_check() {
    let a = article("a", Some(NOW), Some(0), false);
    let b = article("b", Some(NOW - 48 * HOUR), Some(0), false);

    let ranked = rank_feed_scored(vec![b, a], &FeedWeights::default(), NOW);

    assert_eq!(ranked[0].item.id, "a");
    assert_eq!(ranked[1].item.id, "b");
    let score_a = ranked[0].score.unwrap();
    let score_b = ranked[1].score.unwrap();
    assert!((score_a - 0.7).abs() < 1e-9);
    assert!((score_b - 0.7 * (-1.0f64).exp()).abs() < 1e-9);
    assert!((score_b - 0.2575).abs() < 1e-3);
}

#[test]
fn test_scenario_engagement_dominance_boundary() {
    let fresh = article("fresh", Some(NOW), Some(0), false);
    let viral = article("viral", Some(NOW - 10_000 * HOUR), Some(999_999), false);

    let ranked = rank_feed_scored(vec![fresh, viral], &FeedWeights::default(), NOW);

    assert_eq!(ranked[0].item.id, "viral");
    assert!((ranked[0].score.unwrap() - 1.8).abs() < 1e-6);
    assert!((ranked[1].score.unwrap() - 0.7).abs() < 1e-9);
}

#[test]
fn test_custom_weights_change_the_balance() {
    let fresh = article("fresh", Some(NOW), Some(0), false);
    let viral = article("viral", Some(NOW - 10_000 * HOUR), Some(999_999), false);
    let weights = FeedWeights::new(48.0, 0.0, 1.0);

    let ranked = rank_feed(&[viral, fresh], &weights, NOW);
    assert_eq!(ids(&ranked), vec!["fresh", "viral"]);
}
