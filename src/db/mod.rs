pub mod memory;
pub mod postgres;
pub mod repository;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::utils::database_retry::with_database_retry;
use crate::Result;
use memory::InMemoryDatabase;
use postgres::PostgresDatabase;
use repository::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

enum Backend {
    Memory,
    Postgres(Arc<PostgresDatabase>),
}

// Database connection and state management
#[derive(Clone)]
pub struct DatabaseClient {
    pub user_repo: Arc<dyn UserRepository>,
    pub group_repo: Arc<dyn GroupRepository>,
    pub post_repo: Arc<dyn PostRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub follow_repo: Arc<dyn FollowRepository>,
    backend: Arc<Backend>,
}

impl DatabaseClient {
    /// Postgres when `DATABASE_URL` is set, otherwise a fresh in-memory store.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        match &config.database_url {
            Some(url) => Self::connect(url).await,
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let database = with_database_retry(|| PostgresDatabase::new(database_url)).await?;
        database.migrate().await?;
        tracing::info!("connected to PostgreSQL");

        Ok(Self {
            user_repo: Arc::new(database.user_repo()),
            group_repo: Arc::new(database.group_repo()),
            post_repo: Arc::new(database.post_repo()),
            comment_repo: Arc::new(database.comment_repo()),
            follow_repo: Arc::new(database.follow_repo()),
            backend: Arc::new(Backend::Postgres(Arc::new(database))),
        })
    }

    pub fn in_memory() -> Self {
        let store = InMemoryDatabase::new();
        Self {
            user_repo: Arc::new(store.clone()),
            group_repo: Arc::new(store.clone()),
            post_repo: Arc::new(store.clone()),
            comment_repo: Arc::new(store.clone()),
            follow_repo: Arc::new(store),
            backend: Arc::new(Backend::Memory),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend.as_ref() {
            Backend::Memory => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        match self.backend.as_ref() {
            Backend::Memory => Ok(()),
            Backend::Postgres(database) => database.ping().await,
        }
    }
}
