use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::time::Instant;
use tracing::warn;

use super::AppState;
use crate::services::FeedQuery;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "news-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

/// Ready once the article store answers a one-item feed query.
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state
        .feed
        .feed_page(
            FeedQuery {
                limit: Some(1),
                ..Default::default()
            },
            Utc::now(),
        )
        .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "ready": true,
            "checks": {"article_store": {"status": "healthy", "latency_ms": latency_ms}},
            "timestamp": Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "ready": false,
                "checks": {"article_store": {
                    "status": "unhealthy",
                    "message": e.to_string(),
                    "latency_ms": latency_ms,
                }},
                "timestamp": Utc::now().to_rfc3339(),
            }))
        }
    }
}
