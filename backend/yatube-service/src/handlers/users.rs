/// User handlers - registration and account management
use actix_web::{web, HttpRequest, HttpResponse};

use super::list_response;
use crate::error::{ErrorResponse, Result};
use crate::middleware::AuthUser;
use crate::models::{UserPayload, UserResponse};
use crate::pagination::PaginationParams;
use crate::services::UserService;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Users ordered by id", body = [UserResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    state: web::Data<AppState>,
    _user: AuthUser,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let page = query.page();
    let users = service.list(page).await?;
    list_response(&req, &query, page, users, service.count()).await
}

/// Register a new user (no authentication required)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let user = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Replace one's own username and password
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not this user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let updated = service
        .update(&user, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not this user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn partial_update_user(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    let updated = service
        .update(&user, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete one's own account with all posts and comments
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not this user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = UserService::new(state.store.clone());
    service.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
