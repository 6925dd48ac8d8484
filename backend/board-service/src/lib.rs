/// Board Service Library
///
/// Persistence and live-notification core for a discussion board: posts,
/// threaded comments, and fan-out of new comments to listeners of a post.
///
/// # Modules
///
/// - `models`: Post, Comment, pagination and opaque id handling
/// - `validation`: comment body rules
/// - `repository`: `BoardStore` contract with in-memory and PostgreSQL engines
/// - `services`: `BoardService`, the input-normalizing facade
/// - `pubsub`: `CommentBus`, best-effort per-post comment fan-out
/// - `db`: PostgreSQL pool and migrations
/// - `config`: Configuration management
/// - `state`: engine selection and wiring
/// - `error`: Error types and handling
/// - `logging`: tracing setup
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod pubsub;
pub mod repository;
pub mod services;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{BoardError, Result};
pub use models::{Comment, Post};
pub use pubsub::{CommentBus, CommentSubscription};
pub use repository::{BoardStore, InMemoryStore, PgStore};
pub use services::BoardService;
pub use state::AppState;
