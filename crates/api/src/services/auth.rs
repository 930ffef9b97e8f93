//! Authentication service: user registration and login.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::User;
use persistence::repositories::UserRepository;
use shared::jwt::{JwtError, JwtKeys};
use shared::password::{hash_password, verify_password, PasswordError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already registered")]
    EmailAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage operations the auth flows need.
#[async_trait]
pub trait UserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn insert(&self, user: &User) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        UserRepository::find_by_email(self, email).await
    }

    async fn insert(&self, user: &User) -> Result<(), sqlx::Error> {
        UserRepository::insert(self, user).await
    }
}

/// Outcome of a successful sign-up or sign-in.
#[derive(Debug)]
pub struct AuthResult {
    pub user: User,
    pub token: String,
}

/// Service handling sign-up and sign-in flows.
#[derive(Clone)]
pub struct AuthService<S = UserRepository> {
    users: S,
    jwt: Arc<JwtKeys>,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(users: S, jwt: Arc<JwtKeys>) -> Self {
        Self { users, jwt }
    }

    /// Registers a new user and issues their first token.
    ///
    /// The email is checked before insert; the unique index on the users
    /// table backstops the race between the check and the write.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthResult, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.jwt.issue(user.id)?;
        Ok(AuthResult { user, token })
    }

    /// Verifies credentials and issues a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User signed in");

        let token = self.jwt.issue(user.id)?;
        Ok(AuthResult { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store mirroring the repository's lowercased lookup.
    #[derive(Default)]
    struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
            let email = email.to_lowercase();
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn insert(&self, user: &User) -> Result<(), sqlx::Error> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }
    }

    fn service() -> AuthService<MemoryUserStore> {
        AuthService::new(
            MemoryUserStore::default(),
            Arc::new(JwtKeys::from_secret("auth_service_test_secret", 3600)),
        )
    }

    #[tokio::test]
    async fn test_second_registration_with_same_email_is_conflict() {
        let service = service();
        service
            .register("ada@example.com", "correct-horse-battery", "Ada", "Lovelace")
            .await
            .unwrap();

        let err = service
            .register("Ada@Example.com", "another-password-1", "Ada", "L")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn test_registered_hash_verifies_original_password() {
        let service = service();
        let result = service
            .register("ada@example.com", "correct-horse-battery", "Ada", "Lovelace")
            .await
            .unwrap();

        assert_ne!(result.user.password_hash, "correct-horse-battery");
        assert!(
            verify_password("correct-horse-battery", &result.user.password_hash).unwrap()
        );
        assert!(!result.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let service = service();
        let err = service
            .login("nobody@example.com", "whatever-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_rejected() {
        let service = service();
        service
            .register("ada@example.com", "correct-horse-battery", "Ada", "Lovelace")
            .await
            .unwrap();

        let err = service
            .login("ada@example.com", "incorrect-horse")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let result = service
            .login("ada@example.com", "correct-horse-battery")
            .await
            .unwrap();
        assert!(!result.token.is_empty());
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::EmailAlreadyExists.to_string(),
            "Email is already registered"
        );
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
    }
}
