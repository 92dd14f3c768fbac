//! Contact form submissions.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Contact;

const CONTACT_COLUMNS: &str = "id, name, email, phone, message, created_at, updated_at";

pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        message: &str,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            r"
            INSERT INTO hridved.contacts (name, email, phone, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(message)
        .fetch_one(self.pool)
        .await?;
        Ok(contact)
    }

    /// Every message, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM hridved.contacts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(contacts)
    }
}
