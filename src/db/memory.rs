// In-memory storage used by tests and when no DATABASE_URL is configured
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::repository::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use crate::models::{Comment, Follow, Group, Post, PostFilter, User};
use crate::{AppError, Result};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>, // insertion order
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl Tables {
    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id() == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|follow| follow.user_id == user_id && follow.author_id == post.author_id),
        }
    }

    fn refresh_post_relations(&self, post: &mut Post) {
        if let Some(user) = self.users.iter().find(|user| user.id == post.author_id) {
            post.author_username = user.username.clone();
        }
        if let Some(group_id) = post.group_id() {
            post.group = self
                .groups
                .iter()
                .find(|group| group.id == group_id)
                .map(Into::into);
        }
    }
}

/// One shared set of tables behind a single lock, so every repository trait
/// sees the same data.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|existing| existing.username == user.username) {
            return Err(AppError::ValidationError(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|user| user.username == username).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryDatabase {
    async fn create_group(&self, group: &Group) -> Result<Group> {
        let mut tables = self.tables.lock().await;
        if tables.groups.iter().any(|existing| existing.slug == group.slug) {
            return Err(AppError::ValidationError(format!(
                "group slug '{}' is already taken",
                group.slug
            )));
        }
        tables.groups.push(group.clone());
        Ok(group.clone())
    }

    async fn get_group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let tables = self.tables.lock().await;
        Ok(tables.groups.iter().find(|group| group.id == id).cloned())
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let tables = self.tables.lock().await;
        Ok(tables.groups.iter().find(|group| group.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let tables = self.tables.lock().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for InMemoryDatabase {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|user| user.id == post.author_id) {
            return Err(AppError::DatabaseError(format!(
                "post author {} does not exist",
                post.author_id
            )));
        }
        let mut stored = post.clone();
        tables.refresh_post_relations(&mut stored);
        tables.posts.push(stored.clone());
        Ok(stored)
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list_posts(&self, filter: PostFilter, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let tables = self.tables.lock().await;
        // Newest insert first, then a stable sort keeps that order for equal dates.
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .rev()
            .filter(|post| tables.matches(post, filter))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .filter(|post| tables.matches(post, filter))
            .count() as u64)
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let mut tables = self.tables.lock().await;
        let position = tables
            .posts
            .iter()
            .position(|existing| existing.id == post.id)
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post.id)))?;

        let mut updated = tables.posts[position].clone();
        updated.text = post.text.clone();
        updated.group = post.group.clone();
        updated.image = post.image.clone();
        tables.refresh_post_relations(&mut updated);
        tables.posts[position] = updated.clone();
        Ok(updated)
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.posts.retain(|post| post.id != id);
        tables.comments.retain(|comment| comment.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        let mut tables = self.tables.lock().await;
        if !tables.posts.iter().any(|post| post.id == comment.post_id) {
            return Err(AppError::NotFound(format!("Post {}", comment.post_id)));
        }
        tables.comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn get_comments_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(comments)
    }

    async fn count_comments(&self) -> Result<u64> {
        let tables = self.tables.lock().await;
        Ok(tables.comments.len() as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryDatabase {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .follows
            .iter()
            .any(|follow| follow.user_id == user_id && follow.author_id == author_id);
        if exists {
            return Ok(false);
        }
        tables.follows.push(Follow {
            id: Uuid::new_v4(),
            user_id,
            author_id,
        });
        Ok(true)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|follow| !(follow.user_id == user_id && follow.author_id == author_id));
        Ok(tables.follows.len() != before)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .follows
            .iter()
            .any(|follow| follow.user_id == user_id && follow.author_id == author_id))
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .follows
            .iter()
            .filter(|follow| follow.user_id == user_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            date_joined: Utc::now(),
        }
    }

    fn post(author: &User, text: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: author.id,
            author_username: author.username.clone(),
            group: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let db = InMemoryDatabase::new();
        let author = db.create_user(&user("author")).await.unwrap();
        let kept = db.create_post(&post(&author, "kept")).await.unwrap();
        let doomed = db.create_post(&post(&author, "doomed")).await.unwrap();

        for target in [&kept, &doomed] {
            db.create_comment(&Comment {
                id: Uuid::new_v4(),
                post_id: target.id,
                author_id: author.id,
                author_username: author.username.clone(),
                text: "nice".into(),
                created: Utc::now(),
            })
            .await
            .unwrap();
        }

        db.delete_post(doomed.id).await.unwrap();

        assert_eq!(db.count_comments().await.unwrap(), 1);
        assert!(db.get_comments_by_post_id(doomed.id).await.unwrap().is_empty());
        assert_eq!(db.get_comments_by_post_id(kept.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feed_is_newest_first_and_filtered() {
        let db = InMemoryDatabase::new();
        let alice = db.create_user(&user("alice")).await.unwrap();
        let bob = db.create_user(&user("bob")).await.unwrap();

        let mut old = post(&alice, "old");
        old.pub_date = Utc::now() - Duration::hours(1);
        db.create_post(&old).await.unwrap();
        db.create_post(&post(&bob, "bob's")).await.unwrap();
        db.create_post(&post(&alice, "new")).await.unwrap();

        let all = db.list_posts(PostFilter::All, 10, 0).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["new", "bob's", "old"]);

        let by_alice = db.list_posts(PostFilter::Author(alice.id), 10, 0).await.unwrap();
        assert_eq!(by_alice.len(), 2);
        assert_eq!(db.count_posts(PostFilter::Author(bob.id)).await.unwrap(), 1);

        assert_eq!(db.count_posts(PostFilter::FollowedBy(bob.id)).await.unwrap(), 0);
        db.create_follow(bob.id, alice.id).await.unwrap();
        let followed = db.list_posts(PostFilter::FollowedBy(bob.id), 10, 0).await.unwrap();
        assert!(followed.iter().all(|p| p.author_id == alice.id));
        assert_eq!(followed.len(), 2);
    }

    #[tokio::test]
    async fn follow_pairs_are_unique() {
        let db = InMemoryDatabase::new();
        let (reader, writer) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(db.create_follow(reader, writer).await.unwrap());
        assert!(!db.create_follow(reader, writer).await.unwrap());
        assert_eq!(db.count_following(reader).await.unwrap(), 1);

        assert!(db.delete_follow(reader, writer).await.unwrap());
        assert!(!db.delete_follow(reader, writer).await.unwrap());
        assert!(!db.is_following(reader, writer).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let db = InMemoryDatabase::new();
        db.create_user(&user("twin")).await.unwrap();
        let err = db.create_user(&user("twin")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
