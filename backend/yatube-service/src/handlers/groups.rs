/// Group handlers - read-only
use actix_web::{web, HttpRequest, HttpResponse};

use super::list_response;
use crate::error::{ErrorResponse, Result};
use crate::middleware::AuthUser;
use crate::models::Group;
use crate::pagination::PaginationParams;
use crate::services::GroupService;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    params(PaginationParams),
    responses(
        (status = 200, description = "Groups ordered by id", body = [Group]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_groups(
    state: web::Data<AppState>,
    _user: AuthUser,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let service = GroupService::new(state.store.clone());
    let page = query.page();
    let groups = service.list(page).await?;
    list_response(&req, &query, page, groups, service.count()).await
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}",
    tag = "groups",
    params(("group_id" = i64, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group found", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = GroupService::new(state.store.clone());
    let group = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(group))
}
