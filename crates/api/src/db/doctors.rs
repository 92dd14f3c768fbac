//! Doctor repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use hridved_core::DoctorId;

use super::RepositoryError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str = "id, name, specialization, image, experience, patients, languages, \
                              fee, tags, quote, available, is_verified, created_at, updated_at";

/// Full replacement of a doctor's profile.
#[derive(Debug, Clone)]
pub struct DoctorUpdate {
    pub name: String,
    pub specialization: String,
    pub image: String,
    pub experience: String,
    pub patients: String,
    pub languages: Vec<String>,
    pub fee: Decimal,
    pub tags: Vec<String>,
    pub quote: String,
    pub available: bool,
    pub is_verified: bool,
}

/// Repository for doctor database operations.
pub struct DoctorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DoctorRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Doctor>, RepositoryError> {
        let doctors = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM hridved.doctors ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(doctors)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, RepositoryError> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM hridved.doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(doctor)
    }

    /// Insert the placeholder profile the admin UI then edits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_sample(&self) -> Result<Doctor, RepositoryError> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            r"
            INSERT INTO hridved.doctors
                (name, specialization, image, experience, patients, languages, fee, tags,
                 quote, available, is_verified)
            VALUES ('New Doctor', 'General', '/images/sample.jpg', '0 Yrs Exp', '0+ Patients',
                    ARRAY['English'], 0, ARRAY['General'], 'Sample quote', TRUE, TRUE)
            RETURNING {DOCTOR_COLUMNS}
            "
        ))
        .fetch_one(self.pool)
        .await?;
        Ok(doctor)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the doctor doesn't exist.
    pub async fn update(
        &self,
        id: DoctorId,
        update: &DoctorUpdate,
    ) -> Result<Doctor, RepositoryError> {
        sqlx::query_as::<_, Doctor>(&format!(
            r"
            UPDATE hridved.doctors
            SET name = $2, specialization = $3, image = $4, experience = $5, patients = $6,
                languages = $7, fee = $8, tags = $9, quote = $10, available = $11,
                is_verified = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {DOCTOR_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.specialization)
        .bind(&update.image)
        .bind(&update.experience)
        .bind(&update.patients)
        .bind(&update.languages)
        .bind(update.fee)
        .bind(&update.tags)
        .bind(&update.quote)
        .bind(update.available)
        .bind(update.is_verified)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DoctorId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.doctors WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
