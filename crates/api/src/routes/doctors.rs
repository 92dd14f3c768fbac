//! Doctor profile routes (`/api/doctors`).

use axum::{extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use hridved_core::{DoctorId, validation::FieldErrors};

use crate::db::DoctorRepository;
use crate::db::doctors::DoctorUpdate;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAdmin;
use crate::models::Doctor;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Doctor not found".to_string())
}

/// GET /api/doctors
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(State(state): State<AppState>) -> Result<AppJson<Vec<Doctor>>> {
    let doctors = DoctorRepository::new(state.pool()).list().await?;
    Ok(AppJson(doctors))
}

/// GET /api/doctors/{id}
///
/// # Errors
///
/// Returns 404 "Doctor not found".
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<DoctorId>,
) -> Result<AppJson<Doctor>> {
    let doctor = DoctorRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(AppJson(doctor))
}

/// POST /api/doctors
///
/// Creates a placeholder profile for the admin to fill in.
///
/// # Errors
///
/// Returns 500 if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<(StatusCode, AppJson<Doctor>)> {
    let doctor = DoctorRepository::new(state.pool()).create_sample().await?;
    tracing::info!(doctor_id = %doctor.id, admin_id = %admin.id, "Sample doctor created");
    Ok((StatusCode::CREATED, AppJson(doctor)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub image: Option<String>,
    pub experience: Option<String>,
    pub patients: Option<String>,
    pub languages: Option<Vec<String>>,
    pub fee: Option<Decimal>,
    pub tags: Option<Vec<String>>,
    pub quote: Option<String>,
    pub available: Option<bool>,
    pub is_verified: Option<bool>,
}

impl DoctorRequest {
    /// Overlay the request on the stored profile and validate the result.
    fn apply_to(self, current: &Doctor) -> Result<DoctorUpdate> {
        let update = DoctorUpdate {
            name: self
                .name
                .map_or_else(|| current.name.clone(), |n| n.trim().to_string()),
            specialization: self
                .specialization
                .map_or_else(|| current.specialization.clone(), |s| s.trim().to_string()),
            image: self.image.unwrap_or_else(|| current.image.clone()),
            experience: self.experience.unwrap_or_else(|| current.experience.clone()),
            patients: self.patients.unwrap_or_else(|| current.patients.clone()),
            languages: self.languages.unwrap_or_else(|| current.languages.clone()),
            fee: self.fee.unwrap_or(current.fee),
            tags: self.tags.unwrap_or_else(|| current.tags.clone()),
            quote: self.quote.unwrap_or_else(|| current.quote.clone()),
            available: self.available.unwrap_or(current.available),
            is_verified: self.is_verified.unwrap_or(current.is_verified),
        };

        let mut errors = FieldErrors::new();
        errors
            .check(!update.name.is_empty(), "name", "Name is required")
            .check(
                !update.specialization.is_empty(),
                "specialization",
                "Specialization is required",
            )
            .check(update.fee >= Decimal::ZERO, "fee", "Fee cannot be negative");
        errors.into_result().map_err(|errors| AppError::Validation {
            message: "Validation failed".to_string(),
            errors,
        })?;

        Ok(update)
    }
}

/// PUT /api/doctors/{id}
///
/// # Errors
///
/// Returns 404 "Doctor not found" or 400 on validation failure.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<DoctorId>,
    AppJson(req): AppJson<DoctorRequest>,
) -> Result<AppJson<Doctor>> {
    let repo = DoctorRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(not_found)?;
    let doctor = repo.update(id, &req.apply_to(&current)?).await?;
    Ok(AppJson(doctor))
}

/// DELETE /api/doctors/{id}
///
/// # Errors
///
/// Returns 404 "Doctor not found".
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DoctorId>,
) -> Result<AppJson<Value>> {
    if !DoctorRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }
    tracing::info!(doctor_id = %id, admin_id = %admin.id, "Doctor removed");
    Ok(AppJson(json!({ "message": "Doctor removed" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Doctor {
        Doctor {
            id: DoctorId::new(4),
            name: "Dr. Meera Nair".to_string(),
            specialization: "Panchakarma".to_string(),
            image: "/images/meera.jpg".to_string(),
            experience: "12 Yrs Exp".to_string(),
            patients: "3000+ Patients".to_string(),
            languages: vec!["English".to_string(), "Malayalam".to_string()],
            fee: Decimal::new(500, 0),
            tags: vec!["Detox".to_string()],
            quote: "Balance first.".to_string(),
            available: true,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let req: DoctorRequest =
            serde_json::from_str(r#"{"fee": 800, "available": false}"#).unwrap();
        let update = req.apply_to(&stored()).unwrap();
        assert_eq!(update.fee, Decimal::new(800, 0));
        assert!(!update.available);
        assert_eq!(update.name, "Dr. Meera Nair");
        assert_eq!(update.languages.len(), 2);
    }

    #[test]
    fn test_update_rejects_blank_name_and_negative_fee() {
        let req: DoctorRequest = serde_json::from_str(r#"{"name": "  ", "fee": -1}"#).unwrap();
        let Err(AppError::Validation { errors, .. }) = req.apply_to(&stored()) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("fee"), Some("Fee cannot be negative"));
    }
}
