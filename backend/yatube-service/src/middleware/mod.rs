/// HTTP middleware and extractors for yatube-service
///
/// Provides bearer-token authentication, the `AuthUser` extractor and
/// per-route request metrics.
pub mod permissions;

pub use permissions::*;

use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::jwt;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

use crate::error::AppError;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::AppState;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Identity carried by a validated access token
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i64,
    pub username: String,
}

/// Validates `Authorization: Bearer <access token>` when the header is present.
///
/// Requests without the header pass through anonymously; endpoints that need
/// a user take `AuthUser`, which answers 401 for them. A header that is
/// present but unusable is rejected here.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

fn authenticate(header: &str) -> Result<TokenSubject, AppError> {
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must be 'Bearer <token>'".to_string())
        })?;

    let claims = jwt::validate_access_token(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        AppError::from(e)
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthorized("Token is invalid or expired".to_string()))?;

    Ok(TokenSubject {
        user_id,
        username: claims.username,
    })
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get(actix_web::http::header::AUTHORIZATION)
                .map(|h| {
                    h.to_str().map(str::to_owned).map_err(|_| {
                        AppError::Unauthorized("Invalid Authorization header".to_string())
                    })
                })
                .transpose()?;

            if let Some(header) = header {
                let subject = authenticate(&header)?;
                req.extensions_mut().insert(subject);
            }

            service.call(req).await
        })
    }
}

/// Authenticated requester, loaded from the store.
///
/// A valid token whose user has since been deleted is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let subject = req.extensions().get::<TokenSubject>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let subject = subject.ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_string())
            })?;
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".to_string()))?;

            let user = state
                .store
                .get_user(subject.user_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| {
                    tracing::warn!(user_id = subject.user_id, "token refers to a missing user");
                    AppError::Unauthorized("User not found".to_string())
                })?;

            Ok(AuthUser {
                id: user.id,
                username: user.username,
            })
        })
    }
}

// =====================================================================
// Request metrics
// =====================================================================

/// Records request counts and latency labelled by route pattern
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let start = Instant::now();
        let method = req.method().to_string();
        // Label by pattern so ids do not explode cardinality
        let route = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());

        Box::pin(async move {
            let result = service.call(req).await;
            let status = match &result {
                Ok(res) => res.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[&method, &route, &status.to_string()])
                .inc();
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[&method, &route])
                .observe(start.elapsed().as_secs_f64());

            result
        })
    }
}
