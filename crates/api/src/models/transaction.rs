//! PhonePe payment attempts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use hridved_core::{OrderId, TransactionId, TransactionStatus, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub merchant_transaction_id: String,
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub payment_response: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
