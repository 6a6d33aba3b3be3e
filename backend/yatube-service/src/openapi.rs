/// OpenAPI documentation for the Yatube API
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::models::{
    AccessTokenResponse, CommentPayload, CommentResponse, Group, PostPayload, PostResponse,
    TokenObtainRequest, TokenPairResponse, TokenRefreshRequest, TokenVerifyRequest, UserPayload,
    UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Yatube API",
        version = "1.0.0",
        description = "Posts, groups, comments and users of the Yatube blogging platform. Reads require a JWT; posts, comments and accounts can only be changed by their author.",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::auth::create_token,
        handlers::auth::refresh_token,
        handlers::auth::verify_token,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::partial_update_user,
        handlers::users::delete_user,
        handlers::groups::list_groups,
        handlers::groups::get_group,
        handlers::posts::list_posts,
        handlers::posts::create_post,
        handlers::posts::get_post,
        handlers::posts::update_post,
        handlers::posts::partial_update_post,
        handlers::posts::delete_post,
        handlers::comments::list_comments,
        handlers::comments::create_comment,
        handlers::comments::get_comment,
        handlers::comments::update_comment,
        handlers::comments::partial_update_comment,
        handlers::comments::delete_comment,
        handlers::health::health_summary,
        handlers::health::readiness_summary,
        handlers::health::liveness_check,
    ),
    components(schemas(
        ErrorResponse,
        TokenObtainRequest,
        TokenRefreshRequest,
        TokenVerifyRequest,
        TokenPairResponse,
        AccessTokenResponse,
        UserPayload,
        UserResponse,
        Group,
        PostPayload,
        PostResponse,
        CommentPayload,
        CommentResponse,
        handlers::health::ReadinessResponse,
    )),
    tags(
        (name = "auth", description = "JWT issue, refresh and verification"),
        (name = "users", description = "Registration and account management"),
        (name = "groups", description = "Read-only communities"),
        (name = "posts", description = "Posts; writes are reserved for the author"),
        (name = "comments", description = "Comments nested under a post"),
        (name = "health", description = "Service health checks"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/jwt/create"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_resource() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/jwt/create",
            "/api/v1/users/{user_id}",
            "/api/v1/groups",
            "/api/v1/posts/{post_id}",
            "/api/v1/posts/{post_id}/comments/{comment_id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
