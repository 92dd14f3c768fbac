//! Consultation booking routes (`/api/doctor-bookings`).
//!
//! A booking is created pending alongside a Razorpay order and confirmed when
//! the checkout signature comes back.

use axum::extract::State;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use hridved_core::{BookingId, BookingStatus, ConsultationType, DoctorId, to_paise};

use crate::db::bookings::NewBooking;
use crate::db::{BookingRepository, DoctorRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::booking::parse_appointment_time;
use crate::models::{Booking, User};
use crate::routes::payments::razorpay;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Booking not found".to_string())
}

/// Whether `user` may see or cancel `booking`.
fn can_access(user: &User, booking: &Booking) -> bool {
    user.is_admin
        || booking.user_id == Some(user.id)
        || booking
            .patient_email
            .eq_ignore_ascii_case(user.email.as_str())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub doctor_id: Option<DoctorId>,
    pub consultation_type: Option<ConsultationType>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub issue: Option<String>,
    pub amount: Option<Decimal>,
}

/// A booking request with every required field present and parsed.
#[derive(Debug)]
struct ValidBooking {
    doctor_id: DoctorId,
    consultation_type: ConsultationType,
    appointment_date: NaiveDate,
    appointment_time: String,
    patient_name: String,
    patient_email: String,
    patient_phone: String,
    issue: Option<String>,
    amount: Decimal,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BookingRequest {
    fn validate(self) -> Result<ValidBooking> {
        let missing = || AppError::BadRequest("Missing required fields".to_string());

        let doctor_id = self.doctor_id.ok_or_else(missing)?;
        let patient_name = present(self.patient_name).ok_or_else(missing)?;
        let patient_email = present(self.patient_email).ok_or_else(missing)?;
        let patient_phone = present(self.patient_phone).ok_or_else(missing)?;
        let date = present(self.appointment_date).ok_or_else(missing)?;
        let appointment_time = present(self.appointment_time).ok_or_else(missing)?;
        let amount = self
            .amount
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(missing)?;

        // Accept a bare date or the date part of an ISO timestamp.
        let appointment_date = date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| AppError::invalid_field("appointmentDate", "Invalid appointment date"))?;
        if parse_appointment_time(&appointment_time).is_none() {
            return Err(AppError::invalid_field(
                "appointmentTime",
                "Invalid appointment time",
            ));
        }

        Ok(ValidBooking {
            doctor_id,
            consultation_type: self.consultation_type.unwrap_or_default(),
            appointment_date,
            appointment_time,
            patient_name,
            patient_email: patient_email.to_lowercase(),
            patient_phone,
            issue: present(self.issue),
            amount,
        })
    }
}

/// POST /api/doctor-bookings/doctor-booking
///
/// Opens a Razorpay order for the consultation fee and records the booking
/// as pending. The caller is attached to the booking when signed in.
///
/// # Errors
///
/// Returns 400 "Missing required fields", 404 "Doctor not found", 503 if
/// Razorpay is not configured.
pub async fn initiate(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    AppJson(req): AppJson<BookingRequest>,
) -> Result<AppJson<Value>> {
    let client = razorpay(&state)?;
    let req = req.validate()?;

    let doctor = DoctorRepository::new(state.pool())
        .get_by_id(req.doctor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let paise = to_paise(req.amount)
        .ok_or_else(|| AppError::invalid_field("amount", "Invalid amount"))?;
    let receipt = format!("doctor-booking-{}", Utc::now().timestamp_millis());
    let order = client.create_order(req.amount, "INR", Some(&receipt)).await?;
    let razorpay_order_id = order
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Internal("Razorpay order has no id".to_string()))?
        .to_string();

    let booking = BookingRepository::new(state.pool())
        .create(&NewBooking {
            doctor_id: doctor.id,
            doctor_name: doctor.name,
            user_id: user.map(|u| u.id),
            patient_name: req.patient_name,
            patient_email: req.patient_email,
            patient_phone: req.patient_phone,
            consultation_type: req.consultation_type,
            appointment_date: req.appointment_date,
            appointment_time: req.appointment_time,
            issue: req.issue,
            amount: req.amount,
            order_id: razorpay_order_id.clone(),
        })
        .await?;

    tracing::info!(
        booking_id = %booking.id,
        doctor_id = %booking.doctor_id,
        %razorpay_order_id,
        "Consultation booking initiated"
    );

    Ok(AppJson(json!({
        "success": true,
        "razorpayOrderId": razorpay_order_id,
        "razorpayKeyId": client.key_id(),
        "amount": paise,
        "bookingId": booking.id,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBookingRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// POST /api/doctor-bookings/verify-doctor-booking
///
/// # Errors
///
/// Returns 400 "Invalid payment signature" or 404 "Booking not found".
pub async fn verify(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyBookingRequest>,
) -> Result<AppJson<Value>> {
    let client = razorpay(&state)?;
    if !client.verify_signature(&req.order_id, &req.payment_id, &req.signature) {
        tracing::warn!(order_id = %req.order_id, "Booking payment signature mismatch");
        return Err(AppError::BadRequest(
            "Invalid payment signature".to_string(),
        ));
    }

    let booking = BookingRepository::new(state.pool())
        .confirm_by_order(&req.order_id, &req.payment_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => AppError::Database(other),
        })?;
    tracing::info!(booking_id = %booking.id, "Consultation booking confirmed");

    Ok(AppJson(json!({
        "success": true,
        "message": "Payment verified successfully",
        "booking": booking,
    })))
}

/// GET /api/doctor-bookings
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Vec<Booking>>> {
    let bookings = BookingRepository::new(state.pool())
        .list_for_patient(user.id, user.email.as_str())
        .await?;
    Ok(AppJson(bookings))
}

/// GET /api/doctor-bookings/{id}
///
/// # Errors
///
/// Returns 404 "Booking not found" or 403 for someone else's booking.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<BookingId>,
) -> Result<AppJson<Booking>> {
    let booking = BookingRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(not_found)?;
    if !can_access(&user, &booking) {
        return Err(AppError::Forbidden(
            "Not authorized to view this booking".to_string(),
        ));
    }
    Ok(AppJson(booking))
}

/// PUT /api/doctor-bookings/{id}/cancel
///
/// # Errors
///
/// Returns 400 "Cannot cancel within 2 hours of appointment".
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<BookingId>,
) -> Result<AppJson<Value>> {
    let repo = BookingRepository::new(state.pool());
    let booking = repo.get_by_id(id).await?.ok_or_else(not_found)?;
    if !can_access(&user, &booking) {
        return Err(AppError::Forbidden(
            "Not authorized to cancel this booking".to_string(),
        ));
    }
    if !booking.cancellable_at(Utc::now()) {
        return Err(AppError::BadRequest(
            "Cannot cancel within 2 hours of appointment".to_string(),
        ));
    }

    let booking = repo.set_status(id, BookingStatus::Cancelled).await?;
    tracing::info!(booking_id = %id, user_id = %user.id, "Consultation booking cancelled");
    Ok(AppJson(json!({
        "message": "Booking cancelled successfully",
        "booking": booking,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingQuery {
    pub status: Option<String>,
    pub doctor_id: Option<String>,
}

impl AdminBookingQuery {
    fn filters(&self) -> Result<(Option<BookingStatus>, Option<DoctorId>)> {
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(
                s.parse::<BookingStatus>()
                    .map_err(|_| AppError::BadRequest("Invalid status filter".to_string()))?,
            ),
            None => None,
        };
        let doctor_id = match self.doctor_id.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => Some(
                s.parse::<DoctorId>()
                    .map_err(|_| AppError::BadRequest("Invalid resource ID format".to_string()))?,
            ),
            None => None,
        };
        Ok((status, doctor_id))
    }
}

/// GET /api/doctor-bookings/admin/all
///
/// # Errors
///
/// Returns 400 for an unknown status or malformed doctor id.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppQuery(query): AppQuery<AdminBookingQuery>,
) -> Result<AppJson<Vec<Booking>>> {
    let (status, doctor_id) = query.filters()?;
    let bookings = BookingRepository::new(state.pool())
        .list_all(status, doctor_id)
        .await?;
    Ok(AppJson(bookings))
}

#[derive(Debug, Deserialize)]
pub struct AdminBookingUpdate {
    pub status: Option<BookingStatus>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

/// PUT /api/doctor-bookings/admin/{id}
///
/// # Errors
///
/// Returns 404 "Booking not found".
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<BookingId>,
    AppJson(req): AppJson<AdminBookingUpdate>,
) -> Result<AppJson<Booking>> {
    let booking = BookingRepository::new(state.pool())
        .admin_update(
            id,
            req.status,
            req.prescription.as_deref(),
            req.notes.as_deref(),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => AppError::Database(other),
        })?;
    tracing::info!(booking_id = %id, admin_id = %admin.id, status = ?booking.status, "Booking updated");
    Ok(AppJson(booking))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::booking::tests::booking_at;
    use crate::models::user::tests::sample_user;

    fn request(json: &str) -> BookingRequest {
        serde_json::from_str(json).unwrap()
    }

    const FULL: &str = r#"{
        "doctorId": 3,
        "consultationType": "clinic",
        "appointmentDate": "2026-11-02T00:00:00.000Z",
        "appointmentTime": "10:30",
        "patientName": " Ravi ",
        "patientEmail": "Ravi@Example.com",
        "patientPhone": "9876543210",
        "amount": 500
    }"#;

    #[test]
    fn test_validate_accepts_iso_date_and_normalizes() {
        let booking = request(FULL).validate().unwrap();
        assert_eq!(booking.doctor_id, DoctorId::new(3));
        assert_eq!(booking.consultation_type, ConsultationType::Clinic);
        assert_eq!(booking.appointment_date.to_string(), "2026-11-02");
        assert_eq!(booking.patient_name, "Ravi");
        assert_eq!(booking.patient_email, "ravi@example.com");
        assert!(booking.issue.is_none());
    }

    #[test]
    fn test_validate_missing_fields() {
        let err = request(r#"{"doctorId": 3, "patientName": "Ravi"}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Missing required fields"));
    }

    #[test]
    fn test_validate_rejects_bad_time() {
        let json = FULL.replace("10:30", "half past ten");
        assert!(matches!(
            request(&json).validate(),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_admin_filters() {
        let query = AdminBookingQuery {
            status: Some("confirmed".to_string()),
            doctor_id: Some("4".to_string()),
        };
        let (status, doctor) = query.filters().unwrap();
        assert_eq!(status, Some(BookingStatus::Confirmed));
        assert_eq!(doctor, Some(DoctorId::new(4)));

        let bad = AdminBookingQuery {
            status: Some("lost".to_string()),
            doctor_id: None,
        };
        assert!(bad.filters().is_err());
        assert_eq!(AdminBookingQuery::default().filters().unwrap(), (None, None));
    }

    #[test]
    fn test_access_by_owner_email_or_admin() {
        let user = sample_user();
        let mut booking = booking_at("2026-11-02", "10:30");
        booking.user_id = None;
        booking.patient_email = user.email.as_str().to_uppercase();
        assert!(can_access(&user, &booking));

        booking.patient_email = "someone@else.com".to_string();
        assert!(!can_access(&user, &booking));

        booking.user_id = Some(user.id);
        assert!(can_access(&user, &booking));

        let admin = User {
            is_admin: true,
            ..sample_user()
        };
        booking.user_id = None;
        assert!(can_access(&admin, &booking));
    }
}
