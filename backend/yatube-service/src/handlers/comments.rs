/// Comment handlers - endpoints nested under `/posts/{post_id}/comments`
use actix_web::{web, HttpRequest, HttpResponse};

use super::list_response;
use crate::error::{ErrorResponse, Result};
use crate::middleware::AuthUser;
use crate::models::{CommentPayload, CommentResponse};
use crate::pagination::PaginationParams;
use crate::services::CommentService;
use crate::AppState;

/// List the comments of a post
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id"), PaginationParams),
    responses(
        (status = 200, description = "Comments ordered by id", body = [CommentResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_comments(
    state: web::Data<AppState>,
    _user: AuthUser,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let page = query.page();
    let comments = service.list(post_id, page).await?;
    list_response(&req, &query, page, comments, service.count(post_id)).await
}

/// Comment on a post
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comments",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = CommentPayload,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.store.clone());
    let comment = service
        .create(&user, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment found", body = CommentResponse),
        (status = 404, description = "Post or comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_comment(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service.get(post_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post or comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service
        .update(&user, post_id, comment_id, body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentPayload,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post or comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn partial_update_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    let comment = service
        .update(&user, post_id, comment_id, body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post or comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(state.store.clone());
    service.delete(&user, post_id, comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
