use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Page, Store, StoreError, StoreResult};
use crate::models::{
    CommentRow, Group, NewComment, NewGroup, NewPost, NewUser, PostChanges, PostRow, UserChanges,
    UserRow,
};

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    text: String,
    created: DateTime<Utc>,
    author_id: i64,
    post_id: i64,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, UserRow>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, StoredPost>,
    comments: BTreeMap<i64, StoredComment>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn post_row(&self, post: &StoredPost) -> PostRow {
        PostRow {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            author_id: post.author_id,
            author_username: self.username(post.author_id),
            group_id: post.group_id,
            image: post.image.clone(),
        }
    }

    fn comment_row(&self, comment: &StoredComment) -> CommentRow {
        CommentRow {
            id: comment.id,
            text: comment.text.clone(),
            created: comment.created,
            author_id: comment.author_id,
            author_username: self.username(comment.author_id),
            post_id: comment.post_id,
        }
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

fn paginate<'a, T: 'a>(items: impl Iterator<Item = &'a T>, page: Page) -> Vec<&'a T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = page
        .limit
        .and_then(|l| usize::try_from(l).ok())
        .unwrap_or(usize::MAX);
    items.skip(offset).take(limit).collect()
}

/// In-process store with the same semantics as `PgStore`, cascades included.
///
/// Ids come from a single sequence shared by all tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_users(&self, page: Page) -> StoreResult<Vec<UserRow>> {
        let tables = self.tables.read().await;
        Ok(paginate(tables.users.values(), page)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, None) {
            return Err(StoreError::Conflict("username already exists".into()));
        }
        let row = UserRow {
            id: tables.next_id(),
            username: user.username,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserRow>> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &changes.username {
            if tables.username_taken(username, Some(id)) {
                return Err(StoreError::Conflict("username already exists".into()));
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.posts.retain(|_, p| p.author_id != id);
        let Tables { posts, comments, .. } = &mut *tables;
        comments.retain(|_, c| c.author_id != id && posts.contains_key(&c.post_id));
        Ok(true)
    }

    async fn post_ids_by_author(&self, author_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<i64>>> {
        let tables = self.tables.read().await;
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for post in tables.posts.values() {
            if author_ids.contains(&post.author_id) {
                grouped.entry(post.author_id).or_default().push(post.id);
            }
        }
        Ok(grouped)
    }

    async fn list_groups(&self, page: Page) -> StoreResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(paginate(tables.groups.values(), page)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn count_groups(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.groups.len() as i64)
    }

    async fn get_group(&self, id: i64) -> StoreResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(StoreError::Conflict(
                "group with this slug already exists".into(),
            ));
        }
        let row = Group {
            id: tables.next_id(),
            title: group.title,
            description: group.description,
            slug: group.slug,
        };
        tables.groups.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_posts(&self, page: Page) -> StoreResult<Vec<PostRow>> {
        let tables = self.tables.read().await;
        Ok(paginate(tables.posts.values(), page)
            .into_iter()
            .map(|p| tables.post_row(p))
            .collect())
    }

    async fn count_posts(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.posts.len() as i64)
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<PostRow>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.post_row(p)))
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<PostRow> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(StoreError::InvalidReference("author does not exist".into()));
        }
        if let Some(group_id) = post.group_id {
            if !tables.groups.contains_key(&group_id) {
                return Err(StoreError::InvalidReference("group does not exist".into()));
            }
        }
        let stored = StoredPost {
            id: tables.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        let row = tables.post_row(&stored);
        tables.posts.insert(stored.id, stored);
        Ok(row)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> StoreResult<Option<PostRow>> {
        let mut tables = self.tables.write().await;
        if let Some(Some(group_id)) = changes.group {
            if !tables.groups.contains_key(&group_id) {
                return Err(StoreError::InvalidReference("group does not exist".into()));
            }
        }
        let Some(post) = tables.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            post.text = text;
        }
        if let Some(group) = changes.group {
            post.group_id = group;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        let post = post.clone();
        Ok(Some(tables.post_row(&post)))
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }

    async fn list_comments(&self, post_id: i64, page: Page) -> StoreResult<Vec<CommentRow>> {
        let tables = self.tables.read().await;
        let scoped = tables.comments.values().filter(|c| c.post_id == post_id);
        Ok(paginate(scoped, page)
            .into_iter()
            .map(|c| tables.comment_row(c))
            .collect())
    }

    async fn count_comments(&self, post_id: i64) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as i64)
    }

    async fn get_comment(&self, post_id: i64, id: i64) -> StoreResult<Option<CommentRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|c| c.post_id == post_id)
            .map(|c| tables.comment_row(c)))
    }

    async fn create_comment(&self, comment: NewComment) -> StoreResult<CommentRow> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&comment.author_id) {
            return Err(StoreError::InvalidReference("author does not exist".into()));
        }
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(StoreError::InvalidReference("post does not exist".into()));
        }
        let stored = StoredComment {
            id: tables.next_id(),
            text: comment.text,
            created: Utc::now(),
            author_id: comment.author_id,
            post_id: comment.post_id,
        };
        let row = tables.comment_row(&stored);
        tables.comments.insert(stored.id, stored);
        Ok(row)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        text: String,
    ) -> StoreResult<Option<CommentRow>> {
        let mut tables = self.tables.write().await;
        let Some(comment) = tables
            .comments
            .get_mut(&id)
            .filter(|c| c.post_id == post_id)
        else {
            return Ok(None);
        };
        comment.text = text;
        let comment = comment.clone();
        Ok(Some(tables.comment_row(&comment)))
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let scoped = tables
            .comments
            .get(&id)
            .is_some_and(|c| c.post_id == post_id);
        if scoped {
            tables.comments.remove(&id);
        }
        Ok(scoped)
    }
}
