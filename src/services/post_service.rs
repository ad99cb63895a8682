use crate::db::repository::PostRepository;
use crate::forms::CleanPost;
use crate::media::MediaStorage;
use crate::models::{Post, PostFilter, PostGroup, User};
use crate::pagination::{Page, Paginator};
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    media: Arc<MediaStorage>,
    paginator: Paginator,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository>, media: Arc<MediaStorage>, posts_per_page: u32) -> Self {
        Self {
            post_repo,
            media,
            paginator: Paginator::new(posts_per_page),
        }
    }

    pub async fn create_post(&self, author: &User, form: CleanPost) -> Result<Post> {
        let image = match &form.image {
            Some(upload) => Some(self.media.save_post_image(&upload.filename, &upload.data).await?),
            None => None,
        };

        let post = Post {
            id: Uuid::new_v4(),
            text: form.text,
            pub_date: Utc::now(),
            author_id: author.id,
            author_username: author.username.clone(),
            group: form.group.as_ref().map(PostGroup::from),
            image,
        };

        let created = match self.post_repo.create_post(&post).await {
            Ok(created) => created,
            Err(e) => {
                self.discard_image(post.image.as_deref()).await;
                return Err(e);
            }
        };
        tracing::info!(post_id = %created.id, author = %author.username, "post created");
        Ok(created)
    }

    /// Only the author may edit. Without a new upload the old image stays.
    pub async fn update_post(&self, post_id: Uuid, editor: &User, form: CleanPost) -> Result<Post> {
        let mut post = self.get_post(post_id).await?;
        if post.author_id != editor.id {
            return Err(AppError::Forbidden(format!(
                "{} is not the author of post {}",
                editor.username, post_id
            )));
        }

        let new_image = match &form.image {
            Some(upload) => Some(self.media.save_post_image(&upload.filename, &upload.data).await?),
            None => None,
        };
        if new_image.is_some() {
            post.image = new_image.clone();
        }
        post.text = form.text;
        post.group = form.group.as_ref().map(PostGroup::from);

        let updated = match self.post_repo.update_post(&post).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_image(new_image.as_deref()).await;
                return Err(e);
            }
        };
        tracing::info!(post_id = %updated.id, "post edited");
        Ok(updated)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.post_repo
            .get_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))
    }

    /// One page of a feed, newest first, with the page number resolved from
    /// the raw `page` query value.
    pub async fn feed_page(&self, filter: PostFilter, raw_page: Option<&str>) -> Result<Page<Post>> {
        let count = self.post_repo.count_posts(filter).await?;
        let window = self.paginator.window(count, raw_page);
        let items = self
            .post_repo
            .list_posts(filter, window.limit(), window.offset())
            .await?;
        Ok(Page::new(items, window))
    }

    pub async fn count_by_author(&self, author_id: Uuid) -> Result<u64> {
        self.post_repo.count_posts(PostFilter::Author(author_id)).await
    }

    /// Drops an image whose post never got saved.
    async fn discard_image(&self, name: Option<&str>) {
        if let Some(name) = name {
            self.media.remove(name).await;
        }
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        self.post_repo.delete_post(post_id).await?;
        tracing::info!(post_id = %post_id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDatabase;
    use crate::db::repository::UserRepository;

    async fn setup() -> (PostService, User, User, tempfile::TempDir) {
        let db = InMemoryDatabase::new();
        let media_dir = tempfile::tempdir().unwrap();
        let mut users = Vec::new();
        for name in ["auth", "other"] {
            let user = User {
                id: Uuid::new_v4(),
                username: name.into(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: String::new(),
                date_joined: Utc::now(),
            };
            users.push(db.create_user(&user).await.unwrap());
        }
        let service = PostService::new(
            Arc::new(db),
            Arc::new(MediaStorage::new(media_dir.path())),
            10,
        );
        let other = users.pop().unwrap();
        let author = users.pop().unwrap();
        (service, author, other, media_dir)
    }

    fn clean(text: &str) -> CleanPost {
        CleanPost {
            text: text.into(),
            group: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn thirteen_posts_split_ten_and_three() {
        let (service, author, _, _dir) = setup().await;
        for i in 0..13 {
            service.create_post(&author, clean(&format!("post {i}"))).await.unwrap();
        }

        let first = service.feed_page(PostFilter::All, None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);

        let second = service.feed_page(PostFilter::Author(author.id), Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert_eq!(second.items[2].text, "post 0");
    }

    #[tokio::test]
    async fn only_the_author_can_edit() {
        let (service, author, other, _dir) = setup().await;
        let post = service.create_post(&author, clean("original")).await.unwrap();

        let denied = service.update_post(post.id, &other, clean("hijacked")).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(service.get_post(post.id).await.unwrap().text, "original");

        let edited = service.update_post(post.id, &author, clean("edited")).await.unwrap();
        assert_eq!(edited.text, "edited");
        assert_eq!(edited.pub_date, post.pub_date);
    }

    /// Store that holds one post and rejects every write.
    struct ReadOnlyPosts(Option<Post>);

    #[async_trait::async_trait]
    impl PostRepository for ReadOnlyPosts {
        async fn create_post(&self, _post: &Post) -> Result<Post> {
            Err(AppError::DatabaseError("read only".into()))
        }
        async fn get_post_by_id(&self, _id: Uuid) -> Result<Option<Post>> {
            Ok(self.0.clone())
        }
        async fn list_posts(&self, _filter: PostFilter, _limit: u32, _offset: u32) -> Result<Vec<Post>> {
            Ok(Vec::new())
        }
        async fn count_posts(&self, _filter: PostFilter) -> Result<u64> {
            Ok(0)
        }
        async fn update_post(&self, _post: &Post) -> Result<Post> {
            Err(AppError::DatabaseError("read only".into()))
        }
        async fn delete_post(&self, _id: Uuid) -> Result<()> {
            Err(AppError::DatabaseError("read only".into()))
        }
    }

    fn with_image(text: &str) -> CleanPost {
        CleanPost {
            image: Some(crate::forms::UploadedImage {
                filename: "small.gif".into(),
                data: b"GIF89a".to_vec(),
            }),
            ..clean(text)
        }
    }

    #[tokio::test]
    async fn failed_saves_leave_no_image_behind() {
        let (_, author, _, media_dir) = setup().await;
        let media = Arc::new(MediaStorage::new(media_dir.path()));
        let existing = Post {
            id: Uuid::new_v4(),
            text: "kept".into(),
            pub_date: Utc::now(),
            author_id: author.id,
            author_username: author.username.clone(),
            group: None,
            image: None,
        };
        let service = PostService::new(Arc::new(ReadOnlyPosts(Some(existing.clone()))), media.clone(), 10);

        let created = service.create_post(&author, with_image("new")).await;
        assert!(matches!(created, Err(AppError::DatabaseError(_))));
        assert!(!media.exists("posts/small.gif").await);

        let updated = service.update_post(existing.id, &author, with_image("edited")).await;
        assert!(matches!(updated, Err(AppError::DatabaseError(_))));
        assert!(!media.exists("posts/small.gif").await);
    }

    #[tokio::test]
    async fn missing_posts_are_not_found() {
        let (service, _, _, _dir) = setup().await;
        assert!(matches!(service.get_post(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }
}
