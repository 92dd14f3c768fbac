//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] hridved_core::EmailError),

    /// Invalid credentials (wrong password, unknown email, or an OAuth-only account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token names a user that no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The provider profile carried no email address.
    #[error("email not found in OAuth data")]
    MissingOAuthEmail,

    /// JWT missing required claims, badly signed, or expired.
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// JWT signing failed.
    #[error("token encoding error: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),
}
