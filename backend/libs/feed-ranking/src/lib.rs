//! Feed ranking for the news feed.
//!
//! Two-tier ordering of a snapshot of articles:
//! - Featured articles are pinned to the top in their original order and are never scored.
//! - Regular articles follow, sorted by a blend of recency decay and view-count engagement.
//!
//! Everything here is pure: no I/O, no shared state, safe to call from any number of
//! request handlers at once. The caller supplies `now` so results are reproducible.

pub mod ranker;
pub mod scoring;
pub mod trending;
pub mod weights;

pub use ranker::{rank_feed, rank_feed_now, rank_feed_scored, Rankable, Ranked};
pub use scoring::{engagement_score, ranking_score, recency_score, MILLIS_PER_HOUR};
pub use trending::{trending, DEFAULT_TRENDING_WINDOW_HOURS};
pub use weights::{FeedWeights, WeightsError};
