//! Consulting doctors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::DoctorId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub name: String,
    pub specialization: String,
    pub image: String,
    /// Display text such as "12 Yrs Exp".
    pub experience: String,
    pub patients: String,
    pub languages: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub tags: Vec<String>,
    pub quote: String,
    pub available: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
