/// Board service - input normalization and check ordering over a `BoardStore`
use crate::error::{BoardError, Result};
use crate::models::{parse_id, parse_parent_id, Comment, NewComment, NewPost, Page, Post};
use crate::pubsub::CommentBus;
use crate::repository::BoardStore;
use crate::validation::validate_comment_body;
use std::sync::Arc;

/// Stateless facade; cheap to clone and share between request handlers.
#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
    notifier: Option<Arc<CommentBus>>,
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            notifier: None,
        }
    }

    /// Publish every successfully created comment on `notifier`.
    pub fn with_notifier(store: Arc<dyn BoardStore>, notifier: Arc<CommentBus>) -> Self {
        Self {
            store,
            notifier: Some(notifier),
        }
    }

    pub fn notifier(&self) -> Option<&Arc<CommentBus>> {
        self.notifier.as_ref()
    }

    /// List posts, newest first
    pub async fn list_posts(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Post>> {
        self.store.get_posts(Page::normalize(limit, offset)).await
    }

    /// Get a post by its opaque id
    pub async fn get_post(&self, id: &str) -> Result<Post> {
        let id = parse_id(id)?;
        self.store.get_post_by_id(id).await
    }

    /// Create a post; comments stay closed unless `comments_enabled` is `Some(true)`
    pub async fn create_post(
        &self,
        title: &str,
        content: &str,
        author: &str,
        comments_enabled: Option<bool>,
    ) -> Result<Post> {
        self.store
            .create_post(NewPost {
                title: title.to_string(),
                content: content.to_string(),
                author: author.to_string(),
                comments_enabled: comments_enabled.unwrap_or(false),
            })
            .await
    }

    /// Create a comment.
    ///
    /// Checks run in a fixed order: body validation, post id parsing, the
    /// comments-enabled check (a missing post also reports
    /// `CommentsDisabled`), parent id parsing, then the write.
    pub async fn create_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        author: &str,
        content: &str,
    ) -> Result<Comment> {
        validate_comment_body(content)?;

        let post_id = parse_id(post_id)?;

        match self.store.ensure_comments_enabled(post_id).await {
            Ok(()) => {}
            Err(BoardError::NotFound(_)) | Err(BoardError::CommentsDisabled) => {
                tracing::debug!(post_id, "comment rejected: post closed or missing");
                return Err(BoardError::CommentsDisabled);
            }
            Err(err) => return Err(err),
        }

        let parent_id = parse_parent_id(parent_id)?;

        let comment = self
            .store
            .create_comment(NewComment {
                post_id,
                parent_id,
                author: author.to_string(),
                content: content.to_string(),
            })
            .await?;

        if let Some(notifier) = &self.notifier {
            let report = notifier.publish(&comment).await;
            tracing::debug!(
                comment_id = comment.id,
                delivered = report.delivered,
                dropped = report.dropped,
                "comment published"
            );
        }

        Ok(comment)
    }

    /// List direct children of `parent_id` (roots when absent or empty), oldest first
    pub async fn list_comments(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Comment>> {
        let post_id = parse_id(post_id)?;
        let parent_id = parse_parent_id(parent_id)?;

        self.store
            .get_comments(post_id, parent_id, Page::normalize(limit, offset))
            .await
    }
}
