/// Data models for yatube-service
///
/// This module defines structures for:
/// - User: accounts, owners of posts and comments
/// - Group: read-only communities a post may belong to
/// - Post: text entries with an optional group and image
/// - Comment: replies attached to a single post
///
/// Each model has a database row (`*Row`), a response body and, for writable
/// resources, a request payload plus the store-level insert/change structs.
pub mod auth;
pub mod comment;
pub mod group;
pub mod post;
pub mod user;
pub mod validation;

pub use auth::*;
pub use comment::*;
pub use group::*;
pub use post::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Distinguish an explicit `null` from a missing field.
///
/// Used with `#[serde(default)]` on `Option<Option<T>>` fields: a missing key
/// stays `None`, `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
