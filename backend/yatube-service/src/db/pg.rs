use std::collections::HashMap;

use sqlx::PgPool;
use tracing::debug;

use super::{Page, Store, StoreError, StoreResult};
use crate::models::{
    CommentRow, Group, NewComment, NewGroup, NewPost, NewUser, PostChanges, PostRow, UserChanges,
    UserRow,
};

const POST_COLUMNS: &str = r#"
    p.id, p.text, p.pub_date, p.author_id, u.username AS author_username, p.group_id, p.image
"#;

const COMMENT_COLUMNS: &str = r#"
    c.id, c.text, c.created, c.author_id, u.username AS author_username, c.post_id
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate constraint violations into domain errors
fn map_write_error(err: sqlx::Error, conflict: &str, reference: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(conflict.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::InvalidReference(reference.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self, page: Page) -> StoreResult<Vec<UserRow>> {
        let users = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, date_joined
            FROM users
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, date_joined
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "username already exists", "invalid reference"))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                username = COALESCE($2::varchar, username),
                password_hash = COALESCE($3::text, password_hash)
            WHERE id = $1
            RETURNING id, username, password_hash, date_joined
            "#,
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "username already exists", "invalid reference"))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        // posts and comments go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn post_ids_by_author(&self, author_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<i64>>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT author_id, id FROM posts WHERE author_id = ANY($1) ORDER BY id",
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for (author_id, post_id) in rows {
            grouped.entry(author_id).or_default().push(post_id);
        }
        Ok(grouped)
    }

    async fn list_groups(&self, page: Page) -> StoreResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, description, slug
            FROM groups
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn count_groups(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, description, slug FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, slug
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "group with this slug already exists", "invalid reference"))
    }

    async fn list_posts(&self, page: Page) -> StoreResult<Vec<PostRow>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.id
            LIMIT $1 OFFSET $2
            "#
        );
        let posts = sqlx::query_as::<_, PostRow>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn count_posts(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostRow>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#
        );
        let post = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<PostRow> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, image)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, pub_date, author_id, group_id, image
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&post.text)
            .bind(post.author_id)
            .bind(post.group_id)
            .bind(&post.image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "post already exists", "author or group does not exist"))?;

        debug!(post_id = row.id, author_id = row.author_id, "post inserted");
        Ok(row)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<Option<PostRow>> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts SET
                    text = COALESCE($2::text, text),
                    group_id = CASE WHEN $3::boolean THEN $4::bigint ELSE group_id END,
                    image = CASE WHEN $5::boolean THEN $6::varchar ELSE image END
                WHERE id = $1
                RETURNING id, text, pub_date, author_id, group_id, image
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(changes.text)
            .bind(changes.group.is_some())
            .bind(changes.group.flatten())
            .bind(changes.image.is_some())
            .bind(changes.image.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "post already exists", "group does not exist"))
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: i64, page: Page) -> StoreResult<Vec<CommentRow>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.id
            LIMIT $2 OFFSET $3
            "#
        );
        let comments = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn count_comments(&self, post_id: i64) -> StoreResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn get_comment(&self, post_id: i64, id: i64) -> StoreResult<Option<CommentRow>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1 AND c.post_id = $2
            "#
        );
        let comment = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn create_comment(&self, comment: NewComment) -> StoreResult<CommentRow> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (text, author_id, post_id)
                VALUES ($1, $2, $3)
                RETURNING id, text, created, author_id, post_id
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(&comment.text)
            .bind(comment.author_id)
            .bind(comment.post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, "comment already exists", "author or post does not exist")
            })?;

        debug!(comment_id = row.id, post_id = row.post_id, "comment inserted");
        Ok(row)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        text: String,
    ) -> StoreResult<Option<CommentRow>> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE comments SET text = $3
                WHERE id = $1 AND post_id = $2
                RETURNING id, text, created, author_id, post_id
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );
        let comment = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(post_id)
            .bind(&text)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
