/// HTTP handlers for yatube-service
///
/// This module contains handlers for:
/// - Auth: JWT create / refresh / verify
/// - Users: registration and self-managed accounts
/// - Groups: read-only listing
/// - Posts: CRUD with author-only writes
/// - Comments: CRUD nested under a post
/// - Health: liveness and readiness probes
pub mod auth;
pub mod comments;
pub mod groups;
pub mod health;
pub mod posts;
pub mod users;

use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

use crate::db::Page;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::pagination::{Paginated, PaginationParams};

pub use auth::{create_token, refresh_token, verify_token};
pub use comments::{
    create_comment, delete_comment, get_comment, list_comments, partial_update_comment,
    update_comment,
};
pub use groups::{get_group, list_groups};
pub use health::{health_summary, liveness_check, readiness_summary};
pub use posts::{create_post, delete_post, get_post, list_posts, partial_update_post, update_post};
pub use users::{create_user, delete_user, get_user, list_users, partial_update_user, update_user};

/// Render a list either as a bare array or, when `limit` was given, as an envelope.
/// `count` is only awaited for paginated requests.
pub(crate) async fn list_response<T, F>(
    req: &HttpRequest,
    params: &PaginationParams,
    page: Page,
    results: Vec<T>,
    count: F,
) -> Result<HttpResponse>
where
    T: Serialize,
    F: std::future::Future<Output = Result<i64>>,
{
    if !params.is_paginated() {
        return Ok(HttpResponse::Ok().json(results));
    }
    let count = count.await?;
    Ok(HttpResponse::Ok().json(Paginated::new(req, page, count, results)))
}

/// Fallback for verbs a resource does not support.
/// Authentication still runs first, so anonymous callers get 401.
pub async fn method_not_allowed(_user: AuthUser) -> Result<HttpResponse> {
    Err(AppError::MethodNotAllowed)
}

pub async fn not_found() -> Result<HttpResponse> {
    Err(AppError::NotFound("resource".to_string()))
}
