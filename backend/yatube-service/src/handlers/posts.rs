/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpRequest, HttpResponse};

use super::list_response;
use crate::error::{ErrorResponse, Result};
use crate::middleware::AuthUser;
use crate::models::{PostPayload, PostResponse};
use crate::pagination::PaginationParams;
use crate::services::PostService;
use crate::AppState;

/// List posts
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(PaginationParams),
    responses(
        (status = 200, description = "Posts ordered by id; an envelope when `limit` is set", body = [PostResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_posts(
    state: web::Data<AppState>,
    _user: AuthUser,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let page = query.page();
    let posts = service.list(page).await?;
    list_response(&req, &query, page, posts, service.count()).await
}

/// Create a post authored by the requester
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    request_body = PostPayload,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.create(&user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by id
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = PostResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_post(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Replace a post (author only; `text` required)
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = PostPayload,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_post(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service
        .update(&user, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Partially update a post (author only)
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = PostPayload,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn partial_update_post(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    let post = service
        .update(&user, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post and its comments (author only)
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    params(("post_id" = i64, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.store.clone());
    service.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
