//! Admin user management commands.

use hridved_api::db::{RepositoryError, UserRepository};
use hridved_api::services::auth::{hash_password, validate_password};
use hridved_core::Email;

use super::{CliError, connect};

pub const DEFAULT_EMAIL: &str = "admin@example.com";
pub const DEFAULT_NAME: &str = "Admin User";
pub const DEFAULT_PASSWORD: &str = "123456";

/// Ensure the default admin account exists.
///
/// An existing account with the default email is promoted instead; its
/// password is left alone.
///
/// # Errors
///
/// Returns an error if the password is too short or a query fails.
pub async fn create_default(password: &str) -> Result<(), CliError> {
    let email = Email::parse(DEFAULT_EMAIL)
        .map_err(|_| CliError::InvalidEmail(DEFAULT_EMAIL.to_owned()))?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    match users.get_by_email(&email).await? {
        Some(user) if user.is_admin => {
            tracing::info!("User {} is already an admin", user.email);
        }
        Some(user) => {
            users.promote(&user.email).await?;
            tracing::info!("User {} updated to admin", user.email);
        }
        None => {
            validate_password(password)?;
            let hash = hash_password(password)?;
            let user = users
                .create_with_password(DEFAULT_NAME, &email, &hash, true)
                .await?;
            tracing::info!("Admin user created! ID: {}, Email: {}", user.id, user.email);
            if password == DEFAULT_PASSWORD {
                tracing::warn!("Default password in use; change it after first login");
            }
        }
    }

    Ok(())
}

/// Grant admin rights to an existing account.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` if no account has that email.
pub async fn promote(email: &str) -> Result<(), CliError> {
    let parsed = Email::parse(email).map_err(|_| CliError::InvalidEmail(email.to_owned()))?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .promote(&parsed)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.to_owned()),
            other => CliError::Repository(other),
        })?;

    tracing::info!("User {} ({}) is now an admin", user.name, user.email);
    Ok(())
}
