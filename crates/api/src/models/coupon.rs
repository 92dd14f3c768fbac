//! Promo codes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::{CouponId, CouponTerms, CouponType};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: CouponId,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    pub is_active: bool,
    pub expiry_date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_order_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    #[must_use]
    pub fn terms(&self) -> CouponTerms {
        CouponTerms {
            kind: self.coupon_type,
            discount: self.discount,
            min_order_amount: self.min_order_amount,
            expires_at: self.expiry_date,
            is_active: self.is_active,
        }
    }
}

/// Canonical stored form of a promo code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  welcome10 "), "WELCOME10");
        assert_eq!(normalize_code("DIWALI"), "DIWALI");
    }
}
