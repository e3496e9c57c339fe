use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    /// Duration of feed requests by source (feed, trending, search).
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_request_duration_seconds",
        "Feed request duration segmented by feed source",
        &["source"]
    )
    .expect("failed to register feed_request_duration_seconds");

    /// Total feed requests processed by source.
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_request_total",
        "Total feed requests segmented by feed source",
        &["source"]
    )
    .expect("failed to register feed_request_total");

    /// Number of articles handed to the ranker per request.
    pub static ref FEED_CANDIDATE_COUNT: HistogramVec = register_histogram_vec!(
        "feed_candidate_count",
        "Number of feed candidates ranked segmented by feed source",
        &["source"],
        vec![0.0, 1.0, 5.0, 12.0, 25.0, 50.0, 100.0]
    )
    .expect("failed to register feed_candidate_count");

    /// Article views recorded.
    pub static ref ARTICLE_VIEWS_TOTAL: IntCounter = register_int_counter!(
        "article_views_total",
        "Total article views recorded"
    )
    .expect("failed to register article_views_total");
}
