//! In-memory storage engine.
//!
//! Posts and comments live in two independent tables, each behind its own
//! `RwLock`. No operation holds one table's lock while taking the other's:
//! comment creation reads the post (shared lock, released) before taking the
//! comment table's exclusive lock.

use crate::error::{BoardError, Result};
use crate::models::{Comment, NewComment, NewPost, Page, Post};
use crate::repository::BoardStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Posts by id plus their insertion order.
#[derive(Default)]
struct PostsTable {
    last_id: i64,
    by_id: HashMap<i64, Post>,
    order: Vec<i64>,
}

impl PostsTable {
    fn insert(&mut self, new_post: NewPost) -> Post {
        self.last_id += 1;
        let post = Post {
            id: self.last_id,
            title: new_post.title,
            content: new_post.content,
            author: new_post.author,
            comments_enabled: new_post.comments_enabled,
            created_at: Utc::now(),
        };

        self.by_id.insert(post.id, post.clone());
        self.order.push(post.id);
        post
    }

    /// Walk the insertion order backwards: skip `offset`, take `limit`.
    fn list(&self, page: Page) -> Vec<Post> {
        let offset = page.offset_usize();
        if offset >= self.order.len() {
            return Vec::new();
        }

        let end = self.order.len() - offset;
        self.order[..end]
            .iter()
            .rev()
            .take(page.limit_usize())
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

/// Key of a bucket: all direct children of one parent within one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BucketKey {
    post_id: i64,
    parent_id: Option<i64>,
}

/// Comments by id plus the per-bucket creation order.
#[derive(Default)]
struct CommentsTable {
    last_id: i64,
    by_id: HashMap<i64, Comment>,
    buckets: HashMap<BucketKey, Vec<i64>>,
}

impl CommentsTable {
    fn insert(&mut self, new_comment: NewComment) -> Result<Comment> {
        // The id map is flat, so a parent from another post must be rejected here.
        if let Some(parent_id) = new_comment.parent_id {
            match self.by_id.get(&parent_id) {
                None => return Err(BoardError::ParentNotFound),
                Some(parent) if parent.post_id != new_comment.post_id => {
                    return Err(BoardError::CrossPostParent)
                }
                Some(_) => {}
            }
        }

        self.last_id += 1;
        let comment = Comment {
            id: self.last_id,
            post_id: new_comment.post_id,
            parent_id: new_comment.parent_id,
            author: new_comment.author,
            content: new_comment.content,
            created_at: Utc::now(),
        };

        let key = BucketKey {
            post_id: comment.post_id,
            parent_id: comment.parent_id,
        };
        self.buckets.entry(key).or_default().push(comment.id);
        self.by_id.insert(comment.id, comment.clone());

        Ok(comment)
    }

    fn list(&self, key: BucketKey, page: Page) -> Vec<Comment> {
        let Some(ids) = self.buckets.get(&key) else {
            return Vec::new();
        };

        let start = page.offset_usize().min(ids.len());
        let end = start.saturating_add(page.limit_usize()).min(ids.len());

        ids[start..end]
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

/// Process-local engine; state is lost when the value is dropped.
#[derive(Default)]
pub struct InMemoryStore {
    posts: RwLock<PostsTable>,
    comments: RwLock<CommentsTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_post(&self, id: i64) -> Result<Post> {
        self.posts
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(BoardError::NotFound("post"))
    }
}

#[async_trait]
impl BoardStore for InMemoryStore {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let post = self.posts.write().insert(new_post);
        debug!(post_id = post.id, "post created in memory");
        Ok(post)
    }

    async fn get_posts(&self, page: Page) -> Result<Vec<Post>> {
        Ok(self.posts.read().list(page))
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Post> {
        self.find_post(id)
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let post = self.find_post(new_comment.post_id)?;
        if !post.comments_enabled {
            return Err(BoardError::CommentsDisabled);
        }

        let comment = self.comments.write().insert(new_comment)?;
        debug!(
            comment_id = comment.id,
            post_id = comment.post_id,
            parent_id = ?comment.parent_id,
            "comment created in memory"
        );
        Ok(comment)
    }

    async fn get_comments(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<Comment>> {
        let key = BucketKey { post_id, parent_id };
        Ok(self.comments.read().list(key, page))
    }

    async fn ensure_comments_enabled(&self, post_id: i64) -> Result<()> {
        if self.find_post(post_id)?.comments_enabled {
            Ok(())
        } else {
            Err(BoardError::CommentsDisabled)
        }
    }
}
