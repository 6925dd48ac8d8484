/// Storage engines for posts and comments
///
/// Two interchangeable implementations sit behind `BoardStore`:
/// - `memory::InMemoryStore`: lock-protected maps with a per-parent index
/// - `postgres::PgStore`: parameterized statements against PostgreSQL
pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, Page, Post};
use async_trait::async_trait;

/// Storage contract shared by every engine.
///
/// Entities are returned by value; callers never hold references into engine
/// state. Posts list newest first, comments list oldest first within one
/// `(post_id, parent_id)` bucket.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Insert a post, assigning its id and `created_at`.
    async fn create_post(&self, new_post: NewPost) -> Result<Post>;

    /// List posts, most recent first.
    async fn get_posts(&self, page: Page) -> Result<Vec<Post>>;

    /// Fetch a single post; `NotFound` when absent.
    async fn get_post_by_id(&self, id: i64) -> Result<Post>;

    /// Insert a comment.
    ///
    /// Fails with `NotFound` if the post is missing, `CommentsDisabled` if the
    /// post is closed, `ParentNotFound` if `parent_id` names no comment and
    /// `CrossPostParent` if the parent belongs to a different post. No row is
    /// written on failure.
    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment>;

    /// List the direct children of `parent_id` (roots when `None`), oldest first.
    async fn get_comments(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<Comment>>;

    /// `Ok(())` when the post exists and accepts comments.
    ///
    /// A missing post is `NotFound`, never `CommentsDisabled`.
    async fn ensure_comments_enabled(&self, post_id: i64) -> Result<()>;
}
