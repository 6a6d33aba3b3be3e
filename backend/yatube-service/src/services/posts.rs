/// Post service - listing, retrieval and author-only writes
use std::sync::Arc;

use tracing::info;
use validator::ValidationErrors;

use super::{check, into_result, take_field};
use crate::db::{Page, Store};
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::middleware::{ensure_author, Action, AuthUser};
use crate::models::validation;
use crate::models::{NewPost, PostChanges, PostPayload, PostResponse, PostRow};

pub struct PostService {
    store: Arc<dyn Store>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<PostResponse>> {
        let posts = self.store.list_posts(page).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.store.count_posts().await?)
    }

    pub async fn get(&self, post_id: i64) -> Result<PostResponse> {
        Ok(self.find(post_id).await?.into())
    }

    /// Create a post authored by `author`; any author in the payload is ignored
    pub async fn create(&self, author: &AuthUser, payload: PostPayload) -> Result<PostResponse> {
        let changes = self.validate(payload, false).await?;
        let Some(text) = changes.text else {
            return Err(AppError::field("text", "required", "This field is required."));
        };

        let post = self
            .store
            .create_post(NewPost {
                author_id: author.id,
                text,
                group_id: changes.group.flatten(),
                image: changes.image.flatten(),
            })
            .await?;

        record_write("post", "create");
        info!(post_id = post.id, author_id = author.id, group_id = ?post.group_id, "post created");
        Ok(post.into())
    }

    /// `partial = false` is PUT (text required), `true` is PATCH.
    /// Fields missing from the payload keep their stored values either way.
    pub async fn update(
        &self,
        requester: &AuthUser,
        post_id: i64,
        payload: PostPayload,
        partial: bool,
    ) -> Result<PostResponse> {
        let post = self.find(post_id).await?;
        ensure_author(requester.id, &post, Action::Update)?;

        let changes = self.validate(payload, partial).await?;
        let updated = self
            .store
            .update_post(post_id, changes)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        record_write("post", "update");
        info!(post_id, author_id = requester.id, partial, "post updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, requester: &AuthUser, post_id: i64) -> Result<()> {
        let post = self.find(post_id).await?;
        ensure_author(requester.id, &post, Action::Delete)?;

        if !self.store.delete_post(post_id).await? {
            return Err(post_not_found(post_id));
        }

        record_write("post", "delete");
        info!(post_id, author_id = requester.id, "post deleted");
        Ok(())
    }

    async fn find(&self, post_id: i64) -> Result<PostRow> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    async fn validate(&self, payload: PostPayload, partial: bool) -> Result<PostChanges> {
        let mut errors = ValidationErrors::new();

        let text = take_field(&mut errors, "text", payload.text, partial)
            .and_then(|text| check(&mut errors, "text", validation::not_blank(&text)));

        let image = match payload.image {
            Some(image) => check(&mut errors, "image", validation::image(image.as_deref())),
            None => None,
        };

        let group = match payload.group {
            Some(Some(group_id)) => match self.store.get_group(group_id).await? {
                Some(_) => Some(Some(group_id)),
                None => {
                    errors.add("group", validation::unknown_group(group_id));
                    None
                }
            },
            other => other,
        };

        into_result(errors)?;
        Ok(PostChanges { text, group, image })
    }
}

pub(crate) fn post_not_found(post_id: i64) -> AppError {
    AppError::NotFound(format!("post {}", post_id))
}
