use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::deserialize_some;

/// User row as stored in `users`
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Public representation of a user; `posts` lists the ids of authored posts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub posts: Vec<i64>,
}

impl UserResponse {
    pub fn new(user: &UserRow, posts: Vec<i64>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            posts,
        }
    }
}

/// Body for registration and for user updates (`PUT` requires both fields).
/// An explicit `null` is kept apart from a missing key.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserPayload {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, write_only)]
    pub password: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}
