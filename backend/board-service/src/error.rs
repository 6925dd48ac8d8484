/// Error types for board-service
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    /// Post or comment absent. Carries the entity kind ("post", "comment").
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("parent comment not found")]
    ParentNotFound,

    #[error("parent comment belongs to another post")]
    CrossPostParent,

    #[error("comments are disabled for this post")]
    CommentsDisabled,

    #[error("invalid comment: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("Database error: {0}")]
    Backend(#[from] sqlx::Error),
}

impl BoardError {
    /// Whether the caller may reasonably retry the same operation.
    ///
    /// Only infrastructure failures qualify; domain errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::Backend(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, BoardError>;
