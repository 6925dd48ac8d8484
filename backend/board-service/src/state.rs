use crate::{
    config::{Config, StorageBackend},
    db,
    pubsub::CommentBus,
    repository::{BoardStore, InMemoryStore, PgStore},
    services::BoardService,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Everything the API layer needs, wired from one `Config`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: BoardService,
    /// Live comment fan-out; the service publishes into it after each comment
    pub bus: Arc<CommentBus>,
}

impl AppState {
    /// Build the configured storage engine and attach the notifier.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn BoardStore> = match config.storage {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Arc::new(InMemoryStore::new())
            }
            StorageBackend::Postgres => {
                let db_config = config
                    .database
                    .as_ref()
                    .context("postgres backend selected without database configuration")?;

                let pool = db::create_pool(db_config)
                    .await
                    .context("Failed to create database pool")?;

                if db_config.run_migrations {
                    db::migrate(&pool)
                        .await
                        .context("Failed to run database migrations")?;
                }

                info!("Using PostgreSQL storage");
                Arc::new(PgStore::new(pool).with_query_timeout(db_config.query_timeout()))
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Wire an already-built store, e.g. from tests.
    pub fn with_store(config: Config, store: Arc<dyn BoardStore>) -> Self {
        let bus = Arc::new(CommentBus::new());
        let service = BoardService::with_notifier(store, Arc::clone(&bus));

        Self {
            config: Arc::new(config),
            service,
            bus,
        }
    }
}
