// PostgreSQL repository implementations using sqlx
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::repository::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use crate::models::{Comment, Group, Post, PostFilter, PostGroup, User};
use crate::{AppError, Result};

// PostgreSQL connection pool wrapper
pub struct PostgresDatabase {
    pub pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub async fn new(database_url: &str) -> Result<Self> {
        tracing::info!(max_connections = 20, acquire_timeout_secs = 30, "configuring connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to create connection pool");
                AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    pub fn user_repo(&self) -> PostgresUserRepository {
        PostgresUserRepository { pool: self.pool.clone() }
    }

    pub fn group_repo(&self) -> PostgresGroupRepository {
        PostgresGroupRepository { pool: self.pool.clone() }
    }

    pub fn post_repo(&self) -> PostgresPostRepository {
        PostgresPostRepository { pool: self.pool.clone() }
    }

    pub fn comment_repo(&self) -> PostgresCommentRepository {
        PostgresCommentRepository { pool: self.pool.clone() }
    }

    pub fn follow_repo(&self) -> PostgresFollowRepository {
        PostgresFollowRepository { pool: self.pool.clone() }
    }
}

fn db_error(action: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| AppError::DatabaseError(format!("Failed to {}: {}", action, e))
}

// PostgreSQL User Repository
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            date_joined: row.date_joined,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, date_joined";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.date_joined)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_error("create user"))?;

        Ok(row.into())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("get user by id"))?;

        Ok(row.map(Into::into))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error("get user by username"))?;

        Ok(row.map(Into::into))
    }
}

// PostgreSQL Group Repository
pub struct PostgresGroupRepository {
    pool: Arc<PgPool>,
}

#[derive(FromRow)]
struct GroupRow {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
        }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create_group(&self, group: &Group) -> Result<Group> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO posts_group (id, title, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(group.id)
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_error("create group"))?;

        Ok(row.into())
    }

    async fn get_group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error("get group"))?;

        Ok(row.map(Into::into))
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error("get group by slug"))?;

        Ok(row.map(Into::into))
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM posts_group ORDER BY title",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("list groups"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// PostgreSQL Post Repository
pub struct PostgresPostRepository {
    pool: Arc<PgPool>,
}

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_slug: Option<String>,
    group_title: Option<String>,
    image: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_id, row.group_slug, row.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(PostGroup { id, slug, title }),
            _ => None,
        };
        Post {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author_id: row.author_id,
            author_username: row.author_username,
            group,
            image: row.image,
        }
    }
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title, p.image
    FROM posts_post p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN posts_group g ON g.id = p.group_id
"#;

impl PostgresPostRepository {
    // WHERE clause for a feed filter; every variant except All binds $1.
    fn filter_clause(filter: PostFilter) -> (&'static str, Option<Uuid>) {
        match filter {
            PostFilter::All => ("TRUE", None),
            PostFilter::Group(group_id) => ("p.group_id = $1", Some(group_id)),
            PostFilter::Author(author_id) => ("p.author_id = $1", Some(author_id)),
            PostFilter::FollowedBy(user_id) => (
                "p.author_id IN (SELECT f.author_id FROM posts_follow f WHERE f.user_id = $1)",
                Some(user_id),
            ),
        }
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("get post"))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: &Post) -> Result<Post> {
        sqlx::query(
            r#"
            INSERT INTO posts_post (id, text, pub_date, author_id, group_id, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.author_id)
        .bind(post.group_id())
        .bind(&post.image)
        .execute(&*self.pool)
        .await
        .map_err(db_error("create post"))?;

        self.fetch_post(post.id)
            .await?
            .ok_or_else(|| AppError::DatabaseError("Created post vanished".to_string()))
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        self.fetch_post(id).await
    }

    async fn list_posts(&self, filter: PostFilter, limit: u32, offset: u32) -> Result<Vec<Post>> {
        let (clause, param) = Self::filter_clause(filter);
        let (limit_slot, offset_slot) = if param.is_some() { (2, 3) } else { (1, 2) };
        let sql = format!(
            "{POST_SELECT} WHERE {clause} ORDER BY p.pub_date DESC, p.seq DESC LIMIT ${limit_slot} OFFSET ${offset_slot}"
        );

        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        if let Some(id) = param {
            query = query.bind(id);
        }
        let rows = query
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("list posts"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64> {
        let (clause, param) = Self::filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM posts_post p WHERE {clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(id) = param {
            query = query.bind(id);
        }
        let count = query
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("count posts"))?;

        Ok(count.max(0) as u64)
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let result = sqlx::query(
            "UPDATE posts_post SET text = $2, group_id = $3, image = $4 WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.group_id())
        .bind(&post.image)
        .execute(&*self.pool)
        .await
        .map_err(db_error("update post"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {}", post.id)));
        }

        self.fetch_post(post.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post.id)))
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts_post WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(db_error("delete post"))?;

        Ok(())
    }
}

// PostgreSQL Comment Repository
pub struct PostgresCommentRepository {
    pool: Arc<PgPool>,
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    author_username: String,
    text: String,
    created: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created: row.created,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        sqlx::query(
            r#"
            INSERT INTO posts_comment (id, post_id, author_id, text, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created)
        .execute(&*self.pool)
        .await
        .map_err(db_error("create comment"))?;

        Ok(comment.clone())
    }

    async fn get_comments_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
            FROM posts_comment c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("get comments for post"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_comments(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts_comment")
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("count comments"))?;

        Ok(count.max(0) as u64)
    }
}

// PostgreSQL Follow Repository
pub struct PostgresFollowRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts_follow (id, user_id, author_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(author_id)
        .execute(&*self.pool)
        .await
        .map_err(db_error("create follow"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts_follow WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&*self.pool)
            .await
            .map_err(db_error("delete follow"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM posts_follow WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_error("check follow"))?;

        Ok(exists)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts_follow WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("count follows"))?;

        Ok(count.max(0) as u64)
    }
}
