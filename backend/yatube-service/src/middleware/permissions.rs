/// Authorization module for yatube-service
///
/// Safe methods are open to any authenticated user; writes on an object are
/// reserved for its author. For users, the "author" is the account itself.
use crate::error::AppError;
use crate::metrics::record_permission_denied;
use crate::models::{CommentRow, PostRow, UserRow};

/// Write actions gated by authorship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Resource with a single owning user
pub trait Authored {
    const RESOURCE: &'static str;

    fn author_id(&self) -> i64;
}

impl Authored for PostRow {
    const RESOURCE: &'static str = "post";

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Authored for CommentRow {
    const RESOURCE: &'static str = "comment";

    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Authored for UserRow {
    const RESOURCE: &'static str = "user";

    fn author_id(&self) -> i64 {
        self.id
    }
}

/// Check that `requester_id` may perform `action` on `object`
pub fn ensure_author<T: Authored>(
    requester_id: i64,
    object: &T,
    action: Action,
) -> Result<(), AppError> {
    if object.author_id() == requester_id {
        return Ok(());
    }

    record_permission_denied(T::RESOURCE);
    tracing::info!(
        requester_id,
        author_id = object.author_id(),
        resource = T::RESOURCE,
        action = action.verb(),
        "write rejected: requester is not the author"
    );
    Err(AppError::Forbidden(format!(
        "You can not {} this {}",
        action.verb(),
        T::RESOURCE
    )))
}
