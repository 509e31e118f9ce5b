//! Domain service for accounts and authentication.
//!
//! Handles registration, login, bearer token resolution and account deletion.

use thiserror::Error;

use crate::db::User;
use crate::domain::UserId;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] on a malformed email or short password
    /// - [`AuthError::EmailTaken`] when the email is registered already
    async fn register(&self, email: &str, full_name: &str, password: &str)
    -> Result<User, AuthError>;

    /// Verifies credentials and returns a signed access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Resolves a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for a bad or expired token, or when
    /// the subject no longer exists.
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError>;

    async fn profile(&self, id: UserId) -> Result<User, AuthError>;

    /// Deletes the account together with its habits and their logs.
    async fn delete_account(&self, id: UserId) -> Result<(), AuthError>;
}
