/// Business logic for yatube-service
///
/// Object endpoints resolve in a fixed order: lookup (404), authorship (403),
/// payload validation (400), then the write. Authentication has already
/// happened in the `AuthUser` extractor by the time a service runs.
pub mod auth;
pub mod comments;
pub mod groups;
pub mod posts;
pub mod users;

pub use auth::AuthService;
pub use comments::CommentService;
pub use groups::GroupService;
pub use posts::PostService;
pub use users::UserService;

use validator::{ValidationError, ValidationErrors};

use crate::models::validation;

/// Collect a field check into `errors`, returning the cleaned value on success
pub(crate) fn check<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.add(field, error);
            None
        }
    }
}

/// Unwrap a nullable payload field. `null` is always an error; a missing key
/// is one only when the whole object is being replaced.
pub(crate) fn take_field(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<Option<String>>,
    partial: bool,
) -> Option<String> {
    match value {
        Some(Some(value)) => Some(value),
        Some(None) => {
            errors.add(field, validation::null_not_allowed());
            None
        }
        None if !partial => {
            errors.add(field, validation::required());
            None
        }
        None => None,
    }
}

pub(crate) fn into_result(errors: ValidationErrors) -> crate::error::Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}
