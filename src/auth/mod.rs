pub mod jwt;
pub mod middleware;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use uuid::Uuid;

use crate::{AppError, Result};
pub use jwt::Claims;
use jwt::JwtService;
pub use middleware::{CurrentUser, MaybeUser, SESSION_COOKIE};

pub struct AuthService {
    jwt: JwtService,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            jwt: JwtService::new(secret),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    pub fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.jwt
            .encode_token(&Claims::new(user_id, username, self.session_ttl))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.jwt.decode_token(token)
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::InternalError(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_hash_and_verify() {
        let auth = AuthService::new("secret", 1);
        let hash = auth.hash_password("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(auth.verify_password("correct horse", &hash).unwrap());
        assert!(!auth.verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn generated_tokens_verify() {
        let auth = AuthService::new("secret", 1);
        let id = Uuid::new_v4();
        let token = auth.generate_token(id, "leo").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.username, "leo");
        assert_eq!(claims.user_id().unwrap(), id);
    }
}
