/// Article handlers - HTTP endpoints for article operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ArticleStatus, ArticleUpdate, NewArticle};

#[derive(Debug, Deserialize)]
pub struct MyArticlesParams {
    pub status: Option<String>,
}

pub async fn get_article(
    path: web::Path<Uuid>,
    user: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = state.maybe_actor(user.as_ref()).await?;
    let article = state.articles.get(path.into_inner(), viewer.as_ref()).await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn get_article_by_slug(
    path: web::Path<String>,
    user: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer = state.maybe_actor(user.as_ref()).await?;
    let article = state.articles.get_by_slug(&path, viewer.as_ref()).await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn create_article(
    user: AuthUser,
    state: web::Data<AppState>,
    req: web::Json<NewArticle>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let article = state.articles.create(&actor, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(article))
}

pub async fn update_article(
    path: web::Path<Uuid>,
    user: AuthUser,
    state: web::Data<AppState>,
    req: web::Json<ArticleUpdate>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let article = state
        .articles
        .update(&actor, path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

pub async fn delete_article(
    path: web::Path<Uuid>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    state.articles.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Count one view. Anonymous readers count too.
pub async fn record_view(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.articles.record_view(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn article_analytics(
    path: web::Path<Uuid>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let analytics = state.articles.analytics(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(analytics))
}

pub async fn my_articles(
    query: web::Query<MyArticlesParams>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let status = match query.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() && s != "all" => {
            Some(s.parse::<ArticleStatus>().map_err(AppError::BadRequest)?)
        }
        _ => None,
    };

    let actor = state.actor(&user).await?;
    let articles = state.articles.my_articles(&actor, status).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "articles": articles })))
}

pub async fn my_profile(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let profile = state.users.profile(&user.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}
