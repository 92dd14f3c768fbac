//! PhonePe transaction ledger.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use hridved_core::{OrderId, TransactionStatus, UserId};

use super::RepositoryError;
use crate::models::Transaction;

const TRANSACTION_COLUMNS: &str = "id, user_id, order_id, merchant_transaction_id, \
    transaction_id, amount, status, payment_response, created_at, updated_at";

/// Repository for transaction database operations.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a payment attempt in `PENDING` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("merchantTransactionId")` on a duplicate id.
    pub async fn create_pending(
        &self,
        user_id: UserId,
        order_id: Option<OrderId>,
        merchant_transaction_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, RepositoryError> {
        sqlx::query_as::<_, Transaction>(&format!(
            r"
            INSERT INTO hridved.transactions (user_id, order_id, merchant_transaction_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(order_id)
        .bind(merchant_transaction_id)
        .bind(amount)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)
    }

    /// Settle a transaction with the gateway's verdict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no transaction has that id.
    pub async fn settle(
        &self,
        merchant_transaction_id: &str,
        status: TransactionStatus,
        transaction_id: Option<&str>,
        response: &serde_json::Value,
    ) -> Result<Transaction, RepositoryError> {
        sqlx::query_as::<_, Transaction>(&format!(
            r"
            UPDATE hridved.transactions
            SET status = $2,
                transaction_id = COALESCE($3, transaction_id),
                payment_response = $4,
                updated_at = NOW()
            WHERE merchant_transaction_id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(merchant_transaction_id)
        .bind(status)
        .bind(transaction_id)
        .bind(Json(response))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
