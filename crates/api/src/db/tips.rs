//! Wellness tip repository.

use sqlx::PgPool;

use hridved_core::TipId;

use super::RepositoryError;
use crate::models::Tip;

const TIP_COLUMNS: &str = "id, title, description, image, category, created_at, updated_at";

/// Repository for tip database operations.
pub struct TipRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TipRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Tip>, RepositoryError> {
        let tips = sqlx::query_as::<_, Tip>(&format!(
            "SELECT {TIP_COLUMNS} FROM hridved.tips ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(tips)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TipId) -> Result<Option<Tip>, RepositoryError> {
        let tip = sqlx::query_as::<_, Tip>(&format!(
            "SELECT {TIP_COLUMNS} FROM hridved.tips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(tip)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_sample(&self) -> Result<Tip, RepositoryError> {
        let tip = sqlx::query_as::<_, Tip>(&format!(
            r"
            INSERT INTO hridved.tips (title, description, image, category)
            VALUES ('New Ayurvedic Tip', 'Description of the tip', '/images/sample.jpg', 'Wellness')
            RETURNING {TIP_COLUMNS}
            "
        ))
        .fetch_one(self.pool)
        .await?;
        Ok(tip)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tip doesn't exist.
    pub async fn update(
        &self,
        id: TipId,
        title: &str,
        description: &str,
        image: &str,
        category: &str,
    ) -> Result<Tip, RepositoryError> {
        sqlx::query_as::<_, Tip>(&format!(
            r"
            UPDATE hridved.tips
            SET title = $2, description = $3, image = $4, category = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {TIP_COLUMNS}
            "
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(image)
        .bind(category)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: TipId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.tips WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
