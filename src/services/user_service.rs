use crate::auth::AuthService;
use crate::db::repository::UserRepository;
use crate::models::user::CreateUserRequest;
use crate::models::User;
use crate::{AppError, Result};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        self.user_repo.get_user_by_id(user_id).await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo.get_user_by_username(username).await
    }

    /// Looks up an author for a public page; unknown usernames are a 404.
    pub async fn require_by_username(&self, username: &str) -> Result<User> {
        self.get_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", username)))
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username.trim()).await?.is_some())
    }

    pub async fn create_user(&self, request: CreateUserRequest, auth_service: &AuthService) -> Result<User> {
        let username = request.username.trim().to_string();
        if self.username_taken(&username).await? {
            return Err(AppError::ValidationError(format!(
                "A user with username '{}' already exists",
                username
            )));
        }

        // Hash the password before storing
        let password_hash = auth_service.hash_password(&request.password)?;

        let user = User {
            id: Uuid::new_v4(),
            username,
            email: request.email.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            password_hash,
            date_joined: Utc::now(),
        };

        let created = self.user_repo.create_user(&user).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "user signed up");
        Ok(created)
    }

    /// Returns the user and a fresh session token on success.
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
        auth_service: &AuthService,
    ) -> Result<(User, String)> {
        let invalid = || {
            AppError::AuthError(
                "Please enter a correct username and password. Note that both fields may be case-sensitive."
                    .to_string(),
            )
        };

        let user = self
            .user_repo
            .get_user_by_username(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !auth_service.verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let token = auth_service.generate_token(user.id, &user.username)?;
        Ok((user, token))
    }
}
