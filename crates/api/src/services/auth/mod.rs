//! Authentication service.
//!
//! Password accounts hash with Argon2id. Sessions are HS256 JWTs delivered in
//! the `jwt` cookie (see [`cookie`]) or as a bearer token. Google and Facebook
//! logins resolve to a local account by email.

pub mod cookie;
mod error;
pub mod jwt;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use hridved_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::oauth::OAuthProfile;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// Handles registration, password login, OAuth account linking and token
/// resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with name, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register_with_password(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        self.users
            .create_with_password(name.trim(), &email, &password_hash, false)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// OAuth-only accounts have no password and always fail here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, hash)?;

        Ok(user)
    }

    // =========================================================================
    // OAuth
    // =========================================================================

    /// Find or create the account for a verified provider profile.
    ///
    /// An existing password account is linked to the provider. A new account
    /// is named after the email's local part when the provider gives no name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingOAuthEmail` if the profile has no email.
    /// Returns `AuthError::InvalidEmail` if the provider's email doesn't parse.
    pub async fn login_with_oauth(&self, profile: &OAuthProfile) -> Result<User, AuthError> {
        let raw_email = profile
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingOAuthEmail)?;
        let email = Email::parse(raw_email)?;
        let picture = profile.picture.as_deref().unwrap_or_default();

        if let Some(existing) = self.users.get_by_email(&email).await? {
            let user = self
                .users
                .link_oauth(existing.id, profile.provider, &profile.id, picture)
                .await?;
            tracing::info!(user_id = %user.id, provider = %profile.provider, "OAuth login");
            return Ok(user);
        }

        let name = profile
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.local_part());

        let user = self
            .users
            .create_oauth(name, &email, profile.provider, &profile.id, picture)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;
        tracing::info!(user_id = %user.id, provider = %profile.provider, "OAuth account created");
        Ok(user)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Resolve a session token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad or expired token.
    /// Returns `AuthError::UserNotFound` if the account has been deleted.
    pub async fn user_for_token(
        &self,
        secret: &secrecy::SecretString,
        token: &str,
    ) -> Result<User, AuthError> {
        let claims = jwt::verify_token(secret, token)?;
        self.get_user(claims.user_id).await
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with the client-facing message.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        let Err(AuthError::WeakPassword(msg)) = validate_password("abc") else {
            panic!("expected weak password");
        };
        assert_eq!(msg, "Password must be at least 6 characters");
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("ayurveda123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("ayurveda123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
