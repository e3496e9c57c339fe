use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::Language;
use crate::services::FeedQuery;
use crate::store::FeedCursor;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    pub category: Option<String>,
    pub lang: Option<String>,
    /// Comma-separated state names
    pub states: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl FeedQueryParams {
    fn into_query(self) -> Result<FeedQuery> {
        let cursor = match self.cursor.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => Some(FeedCursor::decode(c)?),
            _ => None,
        };

        Ok(FeedQuery {
            category: self.category,
            language: parse_language(self.lang.as_deref())?,
            states: self
                .states
                .as_deref()
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            limit: self.limit,
            cursor,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub lang: Option<String>,
}

fn parse_language(lang: Option<&str>) -> Result<Option<Language>> {
    match lang.map(str::trim).filter(|l| !l.is_empty()) {
        Some(lang) => lang.parse().map(Some).map_err(AppError::BadRequest),
        None => Ok(None),
    }
}

pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let query = query.into_inner().into_query()?;
    debug!(
        category = ?query.category,
        language = ?query.language,
        limit = ?query.limit,
        "Feed request"
    );

    let page = state.feed.feed_page(query, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn get_trending(
    query: web::Query<TrendingParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let articles = state.feed.trending(query.count, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "articles": articles })))
}

pub async fn search_articles(
    query: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let language = parse_language(query.lang.as_deref())?;
    let articles = state.feed.search(&query.q, language, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "articles": articles })))
}
