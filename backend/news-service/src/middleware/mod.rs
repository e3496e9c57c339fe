/// HTTP middleware for news-service
///
/// Bearer-token authentication is optional: a request without a token passes through
/// anonymously, a request with a bad token is answered with 401 right here. Handlers
/// that need a caller take [`AuthUser`].
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;
use crate::services::Identity;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Access token claims (HS256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Sign `claims` with `secret`. Tokens are normally minted by the identity provider;
/// this exists for local tooling and tests.
pub fn encode_token(secret: &str, claims: &Claims) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

struct JwtKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// `Ok(None)` when no credentials were sent.
    fn authenticate(&self, authorization: Option<&str>) -> Result<Option<Identity>, String> {
        let Some(value) = authorization else {
            return Ok(None);
        };

        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "Invalid Authorization header format".to_string())?;

        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| "Invalid token: malformed user id".to_string())?;

        Ok(Some(Identity {
            id,
            role: data.claims.role,
            name: data.claims.name,
            email: data.claims.email,
        }))
    }
}

/// Actix middleware that authenticates optional Bearer tokens.
pub struct JwtAuthMiddleware {
    keys: Arc<JwtKeys>,
}

impl JwtAuthMiddleware {
    pub fn new(secret: &str) -> Self {
        Self {
            keys: Arc::new(JwtKeys::new(secret)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let keys = self.keys.clone();

        Box::pin(async move {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|h| h.to_str().unwrap_or_default().to_string());

            match keys.authenticate(authorization.as_deref()) {
                Ok(Some(identity)) => {
                    debug!(user_id = %identity.id, "Authenticated request");
                    req.extensions_mut().insert(AuthUser(identity));
                }
                Ok(None) => {}
                Err(message) => {
                    warn!(path = %req.path(), "JWT validation failed: {}", message);
                    let response = AppError::Unauthorized(message).error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Verified caller identity stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use chrono::Utc;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn claims(sub: &str, exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: sub.to_string(),
            role: Role::Creator,
            exp: (now + exp_offset) as usize,
            iat: now as usize,
            name: Some("Ravi".to_string()),
            email: None,
        }
    }

    async fn whoami(user: Option<AuthUser>) -> HttpResponse {
        match user {
            Some(user) => HttpResponse::Ok().body(user.id().to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    async fn private(user: AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(user.0.role.to_string())
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(JwtAuthMiddleware::new(SECRET))
                    .route("/whoami", web::get().to(whoami))
                    .route("/private", web::get().to(private)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_missing_token_is_anonymous() {
        let app = app!();
        let resp = test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, "anonymous");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/private").to_request()).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_valid_token_sets_user() {
        let app = app!();
        let user_id = Uuid::new_v4();
        let token = encode_token(SECRET, &claims(&user_id.to_string(), 3600)).unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(test::read_body(resp).await, user_id.to_string());

        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(test::read_body(resp).await, "creator");
    }

    #[actix_web::test]
    async fn test_invalid_tokens_rejected() {
        let app = app!();
        let expired = encode_token(SECRET, &claims(&Uuid::new_v4().to_string(), -3600)).unwrap();
        let wrong_key = encode_token(
            "another-secret-that-is-at-least-32-bytes",
            &claims(&Uuid::new_v4().to_string(), 3600),
        )
        .unwrap();
        let bad_sub = encode_token(SECRET, &claims("not-a-uuid", 3600)).unwrap();

        for value in [
            format!("Bearer {}", expired),
            format!("Bearer {}", wrong_key),
            format!("Bearer {}", bad_sub),
            "Basic dXNlcjpwYXNz".to_string(),
        ] {
            let req = test::TestRequest::get()
                .uri("/whoami")
                .insert_header((header::AUTHORIZATION, value.clone()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 401, "{value}");
        }
    }
}
