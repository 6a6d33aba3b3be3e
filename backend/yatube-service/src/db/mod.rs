/// Storage layer for yatube-service
///
/// Handlers and services talk to a `Store`; `PgStore` is the production
/// backend and `MemoryStore` backs local runs and the HTTP tests.
mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use std::collections::HashMap;

use crate::models::{
    CommentRow, Group, NewComment, NewGroup, NewPost, NewUser, PostChanges, PostRow, UserChanges,
    UserRow,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint was violated
    #[error("{0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist
    #[error("{0}")]
    InvalidReference(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Slice of a list query. `limit: None` returns every row from `offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Persistence operations needed by the API.
///
/// Lists are ordered by id. Comment lookups are always scoped to a post.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> StoreResult<()>;

    // Users

    async fn list_users(&self, page: Page) -> StoreResult<Vec<UserRow>>;

    async fn count_users(&self) -> StoreResult<i64>;

    async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow>;

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRow>>;

    /// Removes the user together with their posts and comments
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    /// Post ids grouped by author, for the `posts` field of user bodies
    async fn post_ids_by_author(&self, author_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<i64>>>;

    // Groups

    async fn list_groups(&self, page: Page) -> StoreResult<Vec<Group>>;

    async fn count_groups(&self) -> StoreResult<i64>;

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>>;

    /// Fails with `Conflict` when the slug is taken
    async fn create_group(&self, group: NewGroup) -> StoreResult<Group>;

    // Posts

    async fn list_posts(&self, page: Page) -> StoreResult<Vec<PostRow>>;

    async fn count_posts(&self) -> StoreResult<i64>;

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostRow>>;

    /// Fails with `InvalidReference` when the author or group is missing
    async fn create_post(&self, post: NewPost) -> StoreResult<PostRow>;

    /// Never touches the author
    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<Option<PostRow>>;

    /// Removes the post and its comments
    async fn delete_post(&self, id: i64) -> StoreResult<bool>;

    // Comments

    async fn list_comments(&self, post_id: i64, page: Page) -> StoreResult<Vec<CommentRow>>;

    async fn count_comments(&self, post_id: i64) -> StoreResult<i64>;

    async fn get_comment(&self, post_id: i64, id: i64) -> StoreResult<Option<CommentRow>>;

    async fn create_comment(&self, comment: NewComment) -> StoreResult<CommentRow>;

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        text: String,
    ) -> StoreResult<Option<CommentRow>>;

    async fn delete_comment(&self, post_id: i64, id: i64) -> StoreResult<bool>;
}
