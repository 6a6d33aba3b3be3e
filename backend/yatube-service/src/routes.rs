/// Route table for yatube-service
///
/// Shared by `main` and the HTTP tests so both serve the same surface.
use actix_web::{error, web, HttpRequest};

use crate::error::AppError;
use crate::handlers;
use crate::metrics::serve_metrics;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected JSON body");
    AppError::BadRequest(format!("JSON parse error - {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query parameters - {}", err)).into()
}

/// Non-numeric ids never match an object
fn path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, path = %req.path(), "unparseable path parameter");
    AppError::NotFound(req.path().to_string()).into()
}

/// Register extractor configs, operational endpoints and the `/api/v1` API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/metrics", web::get().to(serve_metrics))
        .route("/api/v1/health", web::get().to(handlers::health_summary))
        .route("/api/v1/health/ready", web::get().to(handlers::readiness_summary))
        .route("/api/v1/health/live", web::get().to(handlers::liveness_check))
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware)
                .wrap(MetricsMiddleware)
                .service(
                    web::scope("/jwt")
                        .route("/create", web::post().to(handlers::create_token))
                        .route("/refresh", web::post().to(handlers::refresh_token))
                        .route("/verify", web::post().to(handlers::verify_token)),
                )
                .service(
                    web::resource("/users")
                        .route(web::get().to(handlers::list_users))
                        .route(web::post().to(handlers::create_user))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/users/{user_id}")
                        .route(web::get().to(handlers::get_user))
                        .route(web::put().to(handlers::update_user))
                        .route(web::patch().to(handlers::partial_update_user))
                        .route(web::delete().to(handlers::delete_user))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/groups")
                        .route(web::get().to(handlers::list_groups))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/groups/{group_id}")
                        .route(web::get().to(handlers::get_group))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/posts")
                        .route(web::get().to(handlers::list_posts))
                        .route(web::post().to(handlers::create_post))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/posts/{post_id}")
                        .route(web::get().to(handlers::get_post))
                        .route(web::put().to(handlers::update_post))
                        .route(web::patch().to(handlers::partial_update_post))
                        .route(web::delete().to(handlers::delete_post))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/posts/{post_id}/comments")
                        .route(web::get().to(handlers::list_comments))
                        .route(web::post().to(handlers::create_comment))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .service(
                    web::resource("/posts/{post_id}/comments/{comment_id}")
                        .route(web::get().to(handlers::get_comment))
                        .route(web::put().to(handlers::update_comment))
                        .route(web::patch().to(handlers::partial_update_comment))
                        .route(web::delete().to(handlers::delete_comment))
                        .default_service(web::to(handlers::method_not_allowed)),
                )
                .default_service(web::to(handlers::not_found)),
        );
}
