//! Coupon repository. Codes are stored uppercase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use hridved_core::{CouponId, CouponType};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str = "id, code, discount, coupon_type, is_active, expiry_date, \
                              min_order_amount, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount: Decimal,
    pub coupon_type: CouponType,
    pub is_active: bool,
    pub expiry_date: DateTime<Utc>,
    pub min_order_amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CouponPatch {
    pub code: Option<String>,
    pub discount: Option<Decimal>,
    pub coupon_type: Option<CouponType>,
    pub is_active: Option<bool>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub min_order_amount: Option<Decimal>,
}

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM hridved.coupons ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(coupons)
    }

    /// Look up an active coupon by its (already normalized) code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM hridved.coupons WHERE code = $1 AND is_active"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;
        Ok(coupon)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("code")` if the code already exists.
    pub async fn create(&self, coupon: &NewCoupon) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            r"
            INSERT INTO hridved.coupons
                (code, discount, coupon_type, is_active, expiry_date, min_order_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(&coupon.code)
        .bind(coupon.discount)
        .bind(coupon.coupon_type)
        .bind(coupon.is_active)
        .bind(coupon.expiry_date)
        .bind(coupon.min_order_amount)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    /// Returns `RepositoryError::Conflict("code")` if the new code is taken.
    pub async fn update(
        &self,
        id: CouponId,
        patch: &CouponPatch,
    ) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            r"
            UPDATE hridved.coupons
            SET code = COALESCE($2, code),
                discount = COALESCE($3, discount),
                coupon_type = COALESCE($4, coupon_type),
                is_active = COALESCE($5, is_active),
                expiry_date = COALESCE($6, expiry_date),
                min_order_amount = COALESCE($7, min_order_amount),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.code.as_deref())
        .bind(patch.discount)
        .bind(patch.coupon_type)
        .bind(patch.is_active)
        .bind(patch.expiry_date)
        .bind(patch.min_order_amount)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_write)?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.coupons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
