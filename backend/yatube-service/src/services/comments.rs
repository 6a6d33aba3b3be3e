/// Comment service - comments nested under a post
///
/// Every lookup is scoped to the post in the URL: a comment id that exists
/// under another post is reported as missing.
use std::sync::Arc;

use tracing::info;
use validator::ValidationErrors;

use super::{check, into_result, posts::post_not_found, take_field};
use crate::db::{Page, Store};
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::middleware::{ensure_author, Action, AuthUser};
use crate::models::validation;
use crate::models::{CommentPayload, CommentResponse, CommentRow, NewComment};

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, post_id: i64, page: Page) -> Result<Vec<CommentResponse>> {
        self.ensure_post(post_id).await?;
        let comments = self.store.list_comments(post_id, page).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    pub async fn count(&self, post_id: i64) -> Result<i64> {
        self.ensure_post(post_id).await?;
        Ok(self.store.count_comments(post_id).await?)
    }

    pub async fn get(&self, post_id: i64, comment_id: i64) -> Result<CommentResponse> {
        Ok(self.find(post_id, comment_id).await?.into())
    }

    pub async fn create(
        &self,
        author: &AuthUser,
        post_id: i64,
        payload: CommentPayload,
    ) -> Result<CommentResponse> {
        self.ensure_post(post_id).await?;
        let Some(text) = validate_text(payload, false)? else {
            return Err(AppError::field("text", "required", "This field is required."));
        };

        let comment = self
            .store
            .create_comment(NewComment {
                post_id,
                author_id: author.id,
                text,
            })
            .await
            .map_err(|e| match e {
                // post removed between the check and the insert
                crate::db::StoreError::InvalidReference(_) => post_not_found(post_id),
                other => other.into(),
            })?;

        record_write("comment", "create");
        info!(comment_id = comment.id, post_id, author_id = author.id, "comment created");
        Ok(comment.into())
    }

    pub async fn update(
        &self,
        requester: &AuthUser,
        post_id: i64,
        comment_id: i64,
        payload: CommentPayload,
        partial: bool,
    ) -> Result<CommentResponse> {
        let comment = self.find(post_id, comment_id).await?;
        ensure_author(requester.id, &comment, Action::Update)?;

        let Some(text) = validate_text(payload, partial)? else {
            // PATCH without changes
            return Ok(comment.into());
        };

        let updated = self
            .store
            .update_comment(post_id, comment_id, text)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;

        record_write("comment", "update");
        info!(comment_id, post_id, author_id = requester.id, partial, "comment updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, requester: &AuthUser, post_id: i64, comment_id: i64) -> Result<()> {
        let comment = self.find(post_id, comment_id).await?;
        ensure_author(requester.id, &comment, Action::Delete)?;

        if !self.store.delete_comment(post_id, comment_id).await? {
            return Err(comment_not_found(comment_id));
        }

        record_write("comment", "delete");
        info!(comment_id, post_id, author_id = requester.id, "comment deleted");
        Ok(())
    }

    async fn ensure_post(&self, post_id: i64) -> Result<()> {
        match self.store.get_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(post_not_found(post_id)),
        }
    }

    async fn find(&self, post_id: i64, comment_id: i64) -> Result<CommentRow> {
        self.ensure_post(post_id).await?;
        self.store
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }
}

fn validate_text(payload: CommentPayload, partial: bool) -> Result<Option<String>> {
    let mut errors = ValidationErrors::new();
    let text = take_field(&mut errors, "text", payload.text, partial)
        .and_then(|text| check(&mut errors, "text", validation::not_blank(&text)));
    into_result(errors)?;
    Ok(text)
}

fn comment_not_found(comment_id: i64) -> AppError {
    AppError::NotFound(format!("comment {}", comment_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewPost, NewUser};
    use actix_web::{http::StatusCode, ResponseError};

    struct Fixture {
        service: CommentService,
        leo: AuthUser,
        anna: AuthUser,
        first_post: i64,
        second_post: i64,
    }

    async fn setup() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut users = Vec::new();
        for name in ["leo", "anna"] {
            let row = store
                .create_user(NewUser {
                    username: name.into(),
                    password_hash: "x".into(),
                })
                .await
                .unwrap();
            users.push(AuthUser {
                id: row.id,
                username: row.username,
            });
        }
        let anna = users.pop().unwrap();
        let leo = users.pop().unwrap();

        let mut posts = Vec::new();
        for text in ["first", "second"] {
            let post = store
                .create_post(NewPost {
                    author_id: leo.id,
                    text: text.into(),
                    group_id: None,
                    image: None,
                })
                .await
                .unwrap();
            posts.push(post.id);
        }

        Fixture {
            service: CommentService::new(store),
            leo,
            anna,
            first_post: posts[0],
            second_post: posts[1],
        }
    }

    fn text(value: &str) -> CommentPayload {
        CommentPayload {
            text: Some(Some(value.into())),
        }
    }

    #[tokio::test]
    async fn comment_belongs_to_url_post() {
        let f = setup().await;
        let comment = f
            .service
            .create(&f.anna, f.first_post, text("nice post"))
            .await
            .unwrap();
        assert_eq!(comment.post, f.first_post);
        assert_eq!(comment.author, "anna");

        let err = f
            .service
            .get(f.second_post, comment.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(f.service.list(f.second_post, Page::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let f = setup().await;
        let err = f.service.create(&f.leo, 12345, text("hi")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = f.service.list(12345, Page::all()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = f.service.count(12345).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn null_text_is_rejected() {
        let f = setup().await;
        let comment = f
            .service
            .create(&f.anna, f.first_post, text("original"))
            .await
            .unwrap();

        let err = f
            .service
            .update(
                &f.anna,
                f.first_post,
                comment.id,
                CommentPayload { text: Some(None) },
                true,
            )
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.field_errors()["text"][0].code, "null")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_author_may_edit() {
        let f = setup().await;
        let comment = f
            .service
            .create(&f.anna, f.first_post, text("mine"))
            .await
            .unwrap();

        // the post author is not the comment author
        let err = f
            .service
            .update(&f.leo, f.first_post, comment.id, text("edited"), false)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let updated = f
            .service
            .update(&f.anna, f.first_post, comment.id, text(" edited "), false)
            .await
            .unwrap();
        assert_eq!(updated.text, "edited");
        assert_eq!(updated.id, comment.id);
    }

    #[tokio::test]
    async fn put_requires_text_patch_may_be_empty() {
        let f = setup().await;
        let comment = f
            .service
            .create(&f.anna, f.first_post, text("original"))
            .await
            .unwrap();

        let err = f
            .service
            .update(&f.anna, f.first_post, comment.id, CommentPayload::default(), false)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let same = f
            .service
            .update(&f.anna, f.first_post, comment.id, CommentPayload::default(), true)
            .await
            .unwrap();
        assert_eq!(same.text, "original");
    }

    #[tokio::test]
    async fn delete_then_gone() {
        let f = setup().await;
        let comment = f
            .service
            .create(&f.anna, f.first_post, text("bye"))
            .await
            .unwrap();

        f.service
            .delete(&f.anna, f.first_post, comment.id)
            .await
            .unwrap();
        let err = f
            .service
            .get(f.first_post, comment.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(f.service.count(f.first_post).await.unwrap(), 0);
    }
}
