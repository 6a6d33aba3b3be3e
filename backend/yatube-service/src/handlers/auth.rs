/// JWT endpoints
use actix_web::{web, HttpResponse};

use crate::error::{ErrorResponse, Result};
use crate::models::{
    AccessTokenResponse, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
    TokenVerifyRequest,
};
use crate::services::AuthService;
use crate::AppState;

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/v1/jwt/create",
    tag = "auth",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn create_token(
    state: web::Data<AppState>,
    body: web::Json<TokenObtainRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new(state.store.clone());
    let pair = service.obtain(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/jwt/refresh",
    tag = "auth",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Access token issued", body = AccessTokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<TokenRefreshRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new(state.store.clone());
    let access = service.refresh(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(access))
}

/// Check that a token is valid
#[utoipa::path(
    post,
    path = "/api/v1/jwt/verify",
    tag = "auth",
    request_body = TokenVerifyRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Token is invalid or expired", body = ErrorResponse)
    )
)]
pub async fn verify_token(
    state: web::Data<AppState>,
    body: web::Json<TokenVerifyRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new(state.store.clone());
    service.verify(body.into_inner())?;
    Ok(HttpResponse::Ok().json(serde_json::json!({})))
}
