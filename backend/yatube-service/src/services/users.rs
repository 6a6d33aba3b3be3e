/// User service - registration, profile reads and self-only account changes
use std::sync::Arc;

use tracing::info;
use validator::ValidationErrors;

use super::{check, into_result, take_field};
use crate::db::{Page, Store};
use crate::error::{field_error, AppError, Result};
use crate::metrics::record_write;
use crate::middleware::{ensure_author, Action, AuthUser};
use crate::models::validation;
use crate::models::{NewUser, UserChanges, UserPayload, UserResponse, UserRow};
use crate::security::{hash_password, validate_password};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub struct UserService {
    store: Arc<dyn Store>,
}

/// Cleaned user payload; `password` is still plaintext
struct ValidUser {
    username: Option<String>,
    password: Option<String>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<UserResponse>> {
        let users = self.store.list_users(page).await?;
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut posts = self.store.post_ids_by_author(&ids).await?;

        Ok(users
            .iter()
            .map(|u| UserResponse::new(u, posts.remove(&u.id).unwrap_or_default()))
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.store.count_users().await?)
    }

    pub async fn get(&self, user_id: i64) -> Result<UserResponse> {
        let user = self.find(user_id).await?;
        self.respond(&user).await
    }

    /// Register a new account; open to anonymous callers
    pub async fn register(&self, payload: UserPayload) -> Result<UserResponse> {
        let valid = self.validate(payload, None, false).await?;
        let (Some(username), Some(password)) = (valid.username, valid.password) else {
            return Err(AppError::Internal("validated registration is incomplete".into()));
        };

        let user = self
            .store
            .create_user(NewUser {
                username,
                password_hash: hash_password(&password)?,
            })
            .await?;

        record_write("user", "create");
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(UserResponse::new(&user, Vec::new()))
    }

    pub async fn update(
        &self,
        requester: &AuthUser,
        user_id: i64,
        payload: UserPayload,
        partial: bool,
    ) -> Result<UserResponse> {
        let user = self.find(user_id).await?;
        ensure_author(requester.id, &user, Action::Update)?;

        let valid = self.validate(payload, Some(&user), partial).await?;
        let password_hash = valid.password.as_deref().map(hash_password).transpose()?;

        let updated = self
            .store
            .update_user(
                user_id,
                UserChanges {
                    username: valid.username,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        record_write("user", "update");
        info!(user_id, partial, "user updated");
        self.respond(&updated).await
    }

    /// Delete the requester's own account with all their posts and comments
    pub async fn delete(&self, requester: &AuthUser, user_id: i64) -> Result<()> {
        let user = self.find(user_id).await?;
        ensure_author(requester.id, &user, Action::Delete)?;

        if !self.store.delete_user(user_id).await? {
            return Err(user_not_found(user_id));
        }

        record_write("user", "delete");
        info!(user_id, "user deleted");
        Ok(())
    }

    async fn find(&self, user_id: i64) -> Result<UserRow> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn respond(&self, user: &UserRow) -> Result<UserResponse> {
        let mut posts = self.store.post_ids_by_author(&[user.id]).await?;
        Ok(UserResponse::new(
            user,
            posts.remove(&user.id).unwrap_or_default(),
        ))
    }

    /// `existing` is the account being updated, `None` for registration
    async fn validate(
        &self,
        payload: UserPayload,
        existing: Option<&UserRow>,
        partial: bool,
    ) -> Result<ValidUser> {
        let mut errors = ValidationErrors::new();

        let username = take_field(&mut errors, "username", payload.username, partial)
            .and_then(|raw| check(&mut errors, "username", validation::username(&raw)));

        if let Some(name) = &username {
            let owner = self.store.get_user_by_username(name).await?;
            let taken = match (owner, existing) {
                (Some(owner), Some(current)) => owner.id != current.id,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if taken {
                errors.add("username", field_error("unique", USERNAME_TAKEN));
            }
        }

        let password = match take_field(&mut errors, "password", payload.password, partial) {
            Some(password) => {
                let against = username
                    .as_deref()
                    .or(existing.map(|u| u.username.as_str()))
                    .unwrap_or_default();
                check(
                    &mut errors,
                    "password",
                    validate_password(&password, against).map(|_| password.clone()),
                )
            }
            None => None,
        };

        into_result(errors)?;
        Ok(ValidUser { username, password })
    }
}

fn user_not_found(user_id: i64) -> AppError {
    AppError::NotFound(format!("user {}", user_id))
}
