//! Consultation booking repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use hridved_core::{BookingId, BookingStatus, ConsultationType, DoctorId, UserId};

use super::RepositoryError;
use crate::models::Booking;

const BOOKING_COLUMNS: &str = "id, doctor_id, doctor_name, user_id, patient_name, patient_email, \
    patient_phone, consultation_type, appointment_date, appointment_time, issue, amount, status, \
    payment_id, order_id, prescription, notes, created_at, updated_at";

/// A booking awaiting payment.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub user_id: Option<UserId>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub consultation_type: ConsultationType,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub issue: Option<String>,
    pub amount: Decimal,
    pub order_id: String,
}

/// Repository for booking database operations.
pub struct BookingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, booking: &NewBooking) -> Result<Booking, RepositoryError> {
        let created = sqlx::query_as::<_, Booking>(&format!(
            r"
            INSERT INTO hridved.doctor_bookings
                (doctor_id, doctor_name, user_id, patient_name, patient_email, patient_phone,
                 consultation_type, appointment_date, appointment_time, issue, amount,
                 status, order_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', $12)
            RETURNING {BOOKING_COLUMNS}
            "
        ))
        .bind(booking.doctor_id)
        .bind(&booking.doctor_name)
        .bind(booking.user_id)
        .bind(&booking.patient_name)
        .bind(&booking.patient_email)
        .bind(&booking.patient_phone)
        .bind(booking.consultation_type)
        .bind(booking.appointment_date)
        .bind(&booking.appointment_time)
        .bind(booking.issue.as_deref())
        .bind(booking.amount)
        .bind(&booking.order_id)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM hridved.doctor_bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(booking)
    }

    /// Confirm the booking paid through the given Razorpay order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no booking carries that order id.
    pub async fn confirm_by_order(
        &self,
        order_id: &str,
        payment_id: &str,
    ) -> Result<Booking, RepositoryError> {
        sqlx::query_as::<_, Booking>(&format!(
            r"
            UPDATE hridved.doctor_bookings
            SET status = 'confirmed', payment_id = $2, updated_at = NOW()
            WHERE id = (
                SELECT id FROM hridved.doctor_bookings
                WHERE order_id = $1
                ORDER BY id DESC
                LIMIT 1
            )
            RETURNING {BOOKING_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(payment_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Bookings made by the user or under their email, latest appointment first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_patient(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r"
            SELECT {BOOKING_COLUMNS}
            FROM hridved.doctor_bookings
            WHERE user_id = $1 OR lower(patient_email) = lower($2)
            ORDER BY appointment_date DESC, appointment_time DESC, id DESC
            "
        ))
        .bind(user_id)
        .bind(email)
        .fetch_all(self.pool)
        .await?;
        Ok(bookings)
    }

    /// Admin listing with optional status and doctor filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<BookingStatus>,
        doctor_id: Option<DoctorId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r"
            SELECT {BOOKING_COLUMNS}
            FROM hridved.doctor_bookings
            WHERE ($1::hridved.booking_status IS NULL OR status = $1)
              AND ($2::int IS NULL OR doctor_id = $2)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(status)
        .bind(doctor_id)
        .fetch_all(self.pool)
        .await?;
        Ok(bookings)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the booking doesn't exist.
    pub async fn set_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, RepositoryError> {
        self.admin_update(id, Some(status), None, None).await
    }

    /// Update status, prescription and notes; `None` keeps the stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the booking doesn't exist.
    pub async fn admin_update(
        &self,
        id: BookingId,
        status: Option<BookingStatus>,
        prescription: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Booking, RepositoryError> {
        sqlx::query_as::<_, Booking>(&format!(
            r"
            UPDATE hridved.doctor_bookings
            SET status = COALESCE($2, status),
                prescription = COALESCE($3, prescription),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(prescription)
        .bind(notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
