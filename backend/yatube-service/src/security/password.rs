/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use validator::ValidationError;

use crate::error::{field_error, AppError};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password using Argon2id
/// Returns the PHC string stored in `users.password_hash`
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

/// Verify a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash has an invalid format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Validate password strength
/// Requirements:
/// - at least 8 characters
/// - not entirely numeric
/// - not the same as the username (case-insensitive)
pub fn validate_password(password: &str, username: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(field_error(
            "password_too_short",
            "This password is too short. It must contain at least 8 characters.",
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(field_error(
            "password_entirely_numeric",
            "This password is entirely numeric.",
        ));
    }

    if !username.is_empty() && password.to_lowercase() == username.to_lowercase() {
        return Err(field_error(
            "password_too_similar",
            "The password is too similar to the username.",
        ));
    }

    Ok(())
}
