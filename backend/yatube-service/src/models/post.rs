use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::deserialize_some;

/// Post joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    /// Username of the author
    pub author: String,
    pub group: Option<i64>,
    pub image: Option<String>,
}

impl From<PostRow> for PostResponse {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author: row.author_username,
            group: row.group_id,
            image: row.image,
        }
    }
}

/// Body of `POST`, `PUT` and `PATCH` on posts.
///
/// Every field tells a missing key apart from an explicit `null`.
/// Any `author` sent by the client is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PostPayload {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub text: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>)]
    pub group: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields to overwrite on an existing post; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub group: Option<Option<i64>>,
    pub image: Option<Option<String>>,
}
