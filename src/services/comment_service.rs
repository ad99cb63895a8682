use crate::db::repository::CommentRepository;
use crate::models::{Comment, Post, User};
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>) -> Self {
        Self { comment_repo }
    }

    pub async fn create_comment(&self, post: &Post, author: &User, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError("Comment text is required".to_string()));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: post.id,
            author_id: author.id,
            author_username: author.username.clone(),
            text: text.to_string(),
            created: Utc::now(),
        };

        let created = self.comment_repo.create_comment(&comment).await?;
        tracing::info!(post_id = %post.id, comment_id = %created.id, "comment added");
        Ok(created)
    }

    /// Oldest first.
    pub async fn get_comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.comment_repo.get_comments_by_post_id(post_id).await
    }

    pub async fn count_comments(&self) -> Result<u64> {
        self.comment_repo.count_comments().await
    }
}
