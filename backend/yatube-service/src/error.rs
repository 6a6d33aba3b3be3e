/// Error types for the Yatube service
///
/// Every failure that reaches a handler is an `AppError`, rendered as
/// `{"error": ..., "status": ...}` (plus `"fields"` for validation failures).
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::JwtError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::db::StoreError;

/// Result type for yatube-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
    /// Per-field messages, present on validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<Map<String, Value>>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure
    pub fn field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, field_error(code, message));
        AppError::Validation(errors)
    }
}

/// Build a `ValidationError` carrying a human-readable message
pub fn field_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    error
}

fn default_message(error: &ValidationError) -> String {
    match error.code.as_ref() {
        "required" => "This field is required.".to_string(),
        "blank" => "This field may not be blank.".to_string(),
        "length" => match error.params.get("max") {
            Some(max) => format!("Ensure this field has no more than {} characters.", max),
            None => "Invalid length.".to_string(),
        },
        code => format!("Invalid value ({}).", code),
    }
}

/// Render validation errors as `{"field": ["message", ...]}`
pub fn validation_fields(errors: &ValidationErrors) -> Map<String, Value> {
    let mut sorted: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                Value::String(
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(e)),
                )
            })
            .collect();
        sorted.insert(field.to_string(), messages);
    }
    sorted
        .into_iter()
        .map(|(k, v)| (k, Value::Array(v)))
        .collect()
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed with internal error");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    status: status.as_u16(),
                    fields: None,
                }
            }
            AppError::Validation(errors) => ErrorResponse {
                error: self.to_string(),
                status: status.as_u16(),
                fields: Some(validation_fields(errors)),
            },
            _ => ErrorResponse {
                error: self.to_string(),
                status: status.as_u16(),
                fields: None,
            },
        };

        let mut response = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            response.insert_header(("WWW-Authenticate", "Bearer realm=\"api\""));
        }
        response.json(body)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::InvalidReference(msg) => AppError::BadRequest(msg),
            StoreError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired
            | JwtError::Invalid(_)
            | JwtError::WrongTokenType { .. } => {
                AppError::Unauthorized("Token is invalid or expired".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
