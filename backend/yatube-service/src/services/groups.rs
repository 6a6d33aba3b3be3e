/// Group service - read access for the API, creation for the seed binary
use std::sync::Arc;

use tracing::info;
use validator::ValidationErrors;

use super::{check, into_result};
use crate::db::{Page, Store, StoreError};
use crate::error::{AppError, Result};
use crate::models::validation::{self, GROUP_TITLE_MAX_LENGTH};
use crate::models::{Group, NewGroup};

pub struct GroupService {
    store: Arc<dyn Store>,
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Group>> {
        Ok(self.store.list_groups(page).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.store.count_groups().await?)
    }

    pub async fn get(&self, group_id: i64) -> Result<Group> {
        self.store
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group {}", group_id)))
    }

    /// Validate and insert a group. A taken slug is a field error.
    pub async fn create(&self, title: &str, slug: &str, description: &str) -> Result<Group> {
        let mut errors = ValidationErrors::new();

        let title = check(
            &mut errors,
            "title",
            validation::not_blank(title).and_then(|t| {
                validation::max_length(&t, GROUP_TITLE_MAX_LENGTH)?;
                Ok(t)
            }),
        );
        let slug = check(&mut errors, "slug", validation::slug(slug));
        into_result(errors)?;

        let (Some(title), Some(slug)) = (title, slug) else {
            return Err(AppError::Internal("validated group is incomplete".into()));
        };

        let group = self
            .store
            .create_group(NewGroup {
                title,
                slug,
                description: description.trim().to_string(),
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AppError::field(
                    "slug",
                    "unique",
                    "group with this slug already exists.",
                ),
                other => other.into(),
            })?;

        info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }
}
