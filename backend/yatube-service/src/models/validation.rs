/// Field-level checks shared by the services
///
/// Each check returns the cleaned value or a `ValidationError` whose message
/// is shown to the client under the field name.
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::error::field_error;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const GROUP_TITLE_MAX_LENGTH: usize = 200;
pub const SLUG_MAX_LENGTH: usize = 50;
pub const IMAGE_MAX_LENGTH: usize = 255;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username regex")
});

static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug regex")
});

pub fn required() -> ValidationError {
    field_error("required", "This field is required.")
}

pub fn null_not_allowed() -> ValidationError {
    field_error("null", "This field may not be null.")
}

/// Trim surrounding whitespace and reject empty results
pub fn not_blank(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(field_error("blank", "This field may not be blank."));
    }
    Ok(trimmed.to_string())
}

pub fn max_length(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        let mut error = field_error(
            "length",
            &format!("Ensure this field has no more than {} characters.", max),
        );
        error.add_param("max".into(), &max);
        return Err(error);
    }
    Ok(())
}

pub fn username(value: &str) -> Result<String, ValidationError> {
    let value = not_blank(value)?;
    max_length(&value, USERNAME_MAX_LENGTH)?;
    if !USERNAME_RE.is_match(&value) {
        return Err(field_error(
            "invalid",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(value)
}

pub fn slug(value: &str) -> Result<String, ValidationError> {
    let value = not_blank(value)?;
    max_length(&value, SLUG_MAX_LENGTH)?;
    if !SLUG_RE.is_match(&value) {
        return Err(field_error(
            "invalid",
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        ));
    }
    Ok(value)
}

/// Optional image reference; blank strings clear the image
pub fn image(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(path) => {
            max_length(path, IMAGE_MAX_LENGTH)?;
            Ok(Some(path.to_string()))
        }
    }
}

pub fn unknown_group(id: i64) -> ValidationError {
    field_error(
        "does_not_exist",
        &format!("Invalid pk \"{}\" - object does not exist.", id),
    )
}
