//! Paid doctor consultation bookings.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::{BookingId, BookingStatus, ConsultationType, DoctorId, UserId};

/// Bookings can't be cancelled closer than this to the appointment.
pub const CANCELLATION_WINDOW: Duration = Duration::hours(2);

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: BookingId,
    #[serde(rename = "doctor")]
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    #[serde(rename = "user")]
    pub user_id: Option<UserId>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub consultation_type: ConsultationType,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub issue: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: BookingStatus,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Appointment start in UTC, or `None` when the stored time is malformed.
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let time = parse_appointment_time(&self.appointment_time)?;
        Some(self.appointment_date.and_time(time).and_utc())
    }

    /// Whether a patient may still cancel at `now`.
    #[must_use]
    pub fn cancellable_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at()
            .is_none_or(|start| start - now >= CANCELLATION_WINDOW)
    }
}

/// Parse an `HH:MM` appointment slot.
#[must_use]
pub fn parse_appointment_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn booking_at(date: &str, time: &str) -> Booking {
        Booking {
            id: BookingId::new(1),
            doctor_id: DoctorId::new(3),
            doctor_name: "Dr. Meera Nair".to_string(),
            user_id: Some(UserId::new(9)),
            patient_name: "Ravi".to_string(),
            patient_email: "ravi@example.com".to_string(),
            patient_phone: "9876543210".to_string(),
            consultation_type: ConsultationType::Video,
            appointment_date: date.parse().unwrap(),
            appointment_time: time.to_string(),
            issue: None,
            amount: Decimal::new(500, 0),
            status: BookingStatus::Confirmed,
            payment_id: None,
            order_id: Some("order_PQ1".to_string()),
            prescription: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_appointment_time() {
        assert!(parse_appointment_time("09:30").is_some());
        assert!(parse_appointment_time("9:30").is_some());
        assert!(parse_appointment_time("25:00").is_none());
        assert!(parse_appointment_time("morning").is_none());
    }

    #[test]
    fn test_cancellation_window() {
        let booking = booking_at("2026-10-20", "15:00");
        let start = booking.starts_at().unwrap();
        assert!(booking.cancellable_at(start - Duration::hours(3)));
        assert!(booking.cancellable_at(start - Duration::hours(2)));
        assert!(!booking.cancellable_at(start - Duration::minutes(90)));
        assert!(!booking.cancellable_at(start + Duration::hours(1)));
    }

    #[test]
    fn test_serializes_date_and_amount() {
        let json = serde_json::to_value(booking_at("2026-10-20", "15:00")).unwrap();
        assert_eq!(json["appointmentDate"], "2026-10-20");
        assert_eq!(json["amount"], 500.0);
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["doctor"], 3);
    }
}
