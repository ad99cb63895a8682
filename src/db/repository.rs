// Repository trait abstractions for database operations
use crate::models::{Comment, Group, Post, PostFilter, User};
use crate::Result;
use uuid::Uuid;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create_group(&self, group: &Group) -> Result<Group>;
    async fn get_group_by_id(&self, id: Uuid) -> Result<Option<Group>>;
    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;
    /// All groups ordered by title.
    async fn list_groups(&self) -> Result<Vec<Group>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: &Post) -> Result<Post>;
    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>>;
    /// Newest first.
    async fn list_posts(&self, filter: PostFilter, limit: u32, offset: u32) -> Result<Vec<Post>>;
    async fn count_posts(&self, filter: PostFilter) -> Result<u64>;
    /// Updates text, group and image; id, author and pub_date never change.
    async fn update_post(&self, post: &Post) -> Result<Post>;
    /// Removes the post and its comments.
    async fn delete_post(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment>;
    /// Oldest first.
    async fn get_comments_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>>;
    async fn count_comments(&self) -> Result<u64>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns false when the pair already existed.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;
    /// Returns false when there was nothing to delete.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;
    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;
    async fn count_following(&self, user_id: Uuid) -> Result<u64>;
}
