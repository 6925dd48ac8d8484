//! PostgreSQL storage engine.
//!
//! Identity and timestamps are assigned by the database (`BIGSERIAL`,
//! `DEFAULT NOW()`). Every statement runs under the store's query deadline;
//! dropping a returned future cancels the statement with it.

use crate::error::{BoardError, Result};
use crate::models::{Comment, NewComment, NewPost, Page, Post};
use crate::repository::BoardStore;
use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Deadline applied to each statement unless overridden
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const ROOT_COMMENTS_QUERY: &str = r#"
    SELECT id, post_id, parent_id, author, content, created_at
    FROM comments
    WHERE post_id = $1 AND parent_id IS NULL
    ORDER BY id ASC
    LIMIT $2 OFFSET $3
"#;

const CHILD_COMMENTS_QUERY: &str = r#"
    SELECT id, post_id, parent_id, author, content, created_at
    FROM comments
    WHERE post_id = $1 AND parent_id = $4
    ORDER BY id ASC
    LIMIT $2 OFFSET $3
"#;

/// Repository over the `posts` and `comments` tables
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a statement under the query deadline.
    async fn run<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(BoardError::from),
            Err(_) => Err(BoardError::Backend(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("query exceeded deadline of {:?}", self.query_timeout),
            )))),
        }
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let post = self
            .run(
                sqlx::query_as::<_, Post>(
                    r#"
                    INSERT INTO posts (title, content, author, comments_enabled)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, title, content, author, comments_enabled, created_at
                    "#,
                )
                .bind(&new_post.title)
                .bind(&new_post.content)
                .bind(&new_post.author)
                .bind(new_post.comments_enabled)
                .fetch_one(&self.pool),
            )
            .await?;

        info!(post_id = post.id, "post created");
        Ok(post)
    }

    async fn get_posts(&self, page: Page) -> Result<Vec<Post>> {
        self.run(
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, title, content, author, comments_enabled, created_at
                FROM posts
                ORDER BY id DESC
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Post> {
        self.run(
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, title, content, author, comments_enabled, created_at
                FROM posts
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(BoardError::NotFound("post"))
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment> {
        self.ensure_comments_enabled(new_comment.post_id).await?;

        // Comments are one flat table: the parent's post must be checked explicitly.
        if let Some(parent_id) = new_comment.parent_id {
            let parent_post_id: Option<i64> = self
                .run(
                    sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
                        .bind(parent_id)
                        .fetch_optional(&self.pool),
                )
                .await?;

            match parent_post_id {
                None => return Err(BoardError::ParentNotFound),
                Some(post_id) if post_id != new_comment.post_id => {
                    return Err(BoardError::CrossPostParent)
                }
                Some(_) => {}
            }
        }

        let comment = self
            .run(
                sqlx::query_as::<_, Comment>(
                    r#"
                    INSERT INTO comments (post_id, parent_id, author, content)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, post_id, parent_id, author, content, created_at
                    "#,
                )
                .bind(new_comment.post_id)
                .bind(new_comment.parent_id)
                .bind(&new_comment.author)
                .bind(&new_comment.content)
                .fetch_one(&self.pool),
            )
            .await?;

        info!(
            comment_id = comment.id,
            post_id = comment.post_id,
            parent_id = ?comment.parent_id,
            "comment created"
        );
        Ok(comment)
    }

    async fn get_comments(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<Comment>> {
        debug!(post_id, ?parent_id, ?page, "listing comments");

        let query = match parent_id {
            None => sqlx::query_as::<_, Comment>(ROOT_COMMENTS_QUERY)
                .bind(post_id)
                .bind(page.limit)
                .bind(page.offset),
            Some(parent_id) => sqlx::query_as::<_, Comment>(CHILD_COMMENTS_QUERY)
                .bind(post_id)
                .bind(page.limit)
                .bind(page.offset)
                .bind(parent_id),
        };

        self.run(query.fetch_all(&self.pool)).await
    }

    async fn ensure_comments_enabled(&self, post_id: i64) -> Result<()> {
        let enabled: Option<bool> = self
            .run(
                sqlx::query_scalar("SELECT comments_enabled FROM posts WHERE id = $1")
                    .bind(post_id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        match enabled {
            None => Err(BoardError::NotFound("post")),
            Some(false) => Err(BoardError::CommentsDisabled),
            Some(true) => Ok(()),
        }
    }
}
