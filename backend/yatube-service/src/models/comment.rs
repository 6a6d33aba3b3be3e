use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::deserialize_some;

/// Comment joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub post_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub post: i64,
    pub created: DateTime<Utc>,
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            author: row.author_username,
            post: row.post_id,
            created: row.created,
        }
    }
}

/// Body of comment writes. `author` and `post` come from the request, never the body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CommentPayload {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub text: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}
