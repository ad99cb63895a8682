// Library modules for the Yatube blogging application
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod media;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod seed;
pub mod services;
pub mod urls;
pub mod utils;
pub mod views;

use std::sync::Arc;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: db::DatabaseClient,
    pub user_service: Arc<services::UserService>,
    pub group_service: Arc<services::GroupService>,
    pub post_service: Arc<services::PostService>,
    pub comment_service: Arc<services::CommentService>,
    pub follow_service: Arc<services::FollowService>,
    pub auth_service: Arc<auth::AuthService>,
    pub media: Arc<media::MediaStorage>,
    pub index_cache: cache::ResponseCache,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = db::DatabaseClient::new(&config).await?;
        Ok(Self::with_database(config, db))
    }

    /// Wires services over an already opened store.
    pub fn with_database(config: AppConfig, db: db::DatabaseClient) -> Self {
        let media = Arc::new(media::MediaStorage::new(config.media_root.clone()));
        let auth_service = Arc::new(auth::AuthService::new(
            &config.session_secret,
            config.session_ttl_hours,
        ));

        let user_service = Arc::new(services::UserService::new(db.user_repo.clone()));
        let group_service = Arc::new(services::GroupService::new(db.group_repo.clone()));
        let post_service = Arc::new(services::PostService::new(
            db.post_repo.clone(),
            media.clone(),
            config.posts_per_page,
        ));
        let comment_service = Arc::new(services::CommentService::new(db.comment_repo.clone()));
        let follow_service = Arc::new(services::FollowService::new(db.follow_repo.clone()));
        let index_cache = cache::ResponseCache::new(config.index_cache_ttl());

        Self {
            config,
            db,
            user_service,
            group_service,
            post_service,
            comment_service,
            follow_service,
            auth_service,
            media,
            index_cache,
        }
    }
}
