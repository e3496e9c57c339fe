/// Admin handlers - user roles and featured articles
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::UpdateRoleRequest;

#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub is_featured: bool,
}

pub async fn list_users(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let users = state.users.list_users(&actor).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "users": users })))
}

pub async fn update_role(
    path: web::Path<Uuid>,
    user: AuthUser,
    state: web::Data<AppState>,
    req: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let profile = state
        .users
        .update_role(&actor, path.into_inner(), req.role)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn set_featured(
    path: web::Path<Uuid>,
    user: AuthUser,
    state: web::Data<AppState>,
    req: web::Json<SetFeaturedRequest>,
) -> Result<HttpResponse> {
    let actor = state.actor(&user).await?;
    let article = state
        .articles
        .set_featured(&actor, path.into_inner(), req.is_featured)
        .await?;
    Ok(HttpResponse::Ok().json(article))
}
