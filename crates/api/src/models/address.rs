//! Saved delivery addresses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hridved_core::{AddressId, AddressType, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    pub full_name: String,
    pub mobile_number: String,
    pub pincode: String,
    pub state: String,
    pub city: String,
    pub house_number: String,
    pub landmark: String,
    pub address_type: AddressType,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
