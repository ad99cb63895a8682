use crate::db::repository::FollowRepository;
use crate::models::User;
use crate::Result;
use std::sync::Arc;

pub struct FollowService {
    follow_repo: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(follow_repo: Arc<dyn FollowRepository>) -> Self {
        Self { follow_repo }
    }

    /// Following yourself or someone you already follow changes nothing.
    /// Returns whether a new subscription was created.
    pub async fn follow(&self, user: &User, author: &User) -> Result<bool> {
        if user.id == author.id {
            tracing::debug!(user = %user.username, "ignoring self-follow");
            return Ok(false);
        }
        let created = self.follow_repo.create_follow(user.id, author.id).await?;
        if created {
            tracing::info!(user = %user.username, author = %author.username, "now following");
        }
        Ok(created)
    }

    pub async fn unfollow(&self, user: &User, author: &User) -> Result<bool> {
        let removed = self.follow_repo.delete_follow(user.id, author.id).await?;
        if removed {
            tracing::info!(user = %user.username, author = %author.username, "unfollowed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user: &User, author: &User) -> Result<bool> {
        self.follow_repo.is_following(user.id, author.id).await
    }

    pub async fn count_following(&self, user: &User) -> Result<u64> {
        self.follow_repo.count_following(user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDatabase;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: name.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            date_joined: Utc::now(),
        }
    }

    #[tokio::test]
    async fn follow_is_idempotent_and_reversible() {
        let service = FollowService::new(Arc::new(InMemoryDatabase::new()));
        let (reader, writer) = (user("reader"), user("writer"));

        assert!(service.follow(&reader, &writer).await.unwrap());
        assert!(!service.follow(&reader, &writer).await.unwrap());
        assert_eq!(service.count_following(&reader).await.unwrap(), 1);
        assert!(service.is_following(&reader, &writer).await.unwrap());
        assert!(!service.is_following(&writer, &reader).await.unwrap());

        assert!(service.unfollow(&reader, &writer).await.unwrap());
        assert_eq!(service.count_following(&reader).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cannot_follow_yourself() {
        let service = FollowService::new(Arc::new(InMemoryDatabase::new()));
        let me = user("me");
        assert!(!service.follow(&me, &me).await.unwrap());
        assert_eq!(service.count_following(&me).await.unwrap(), 0);
    }
}
