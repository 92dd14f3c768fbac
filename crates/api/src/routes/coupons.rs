//! Promo code routes (`/api/coupons`).

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hridved_core::{CouponId, CouponType, validation::FieldErrors};

use crate::db::coupons::{CouponPatch, NewCoupon};
use crate::db::{CouponRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAdmin;
use crate::models::Coupon;
use crate::models::coupon::normalize_code;
use crate::services::checkout::{coupon_error, find_coupon};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub code: Option<String>,
    pub cart_total: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ValidCoupon {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
}

/// POST /api/coupons/validate
///
/// # Errors
///
/// Returns 400 "Please provide a promo code", 404 "Invalid or inactive promo
/// code", or 400 when the coupon has expired or the cart is below its minimum.
pub async fn validate(
    State(state): State<AppState>,
    AppJson(req): AppJson<ValidateRequest>,
) -> Result<AppJson<ValidCoupon>> {
    let Some(code) = req.code.as_deref().filter(|c| !c.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Please provide a promo code".to_string(),
        ));
    };

    let coupon = find_coupon(state.pool(), code).await?;
    coupon
        .terms()
        .check(req.cart_total.unwrap_or(Decimal::ZERO), Utc::now())
        .map_err(|rejection| coupon_error(&rejection))?;

    Ok(AppJson(ValidCoupon {
        code: coupon.code,
        discount: coupon.discount,
        coupon_type: coupon.coupon_type,
    }))
}

/// GET /api/coupons
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<AppJson<Vec<Coupon>>> {
    let coupons = CouponRepository::new(state.pool()).list().await?;
    Ok(AppJson(coupons))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    pub code: Option<String>,
    pub discount: Option<Decimal>,
    #[serde(rename = "type")]
    pub coupon_type: Option<CouponType>,
    pub is_active: Option<bool>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub min_order_amount: Option<Decimal>,
}

impl CouponRequest {
    fn code(&self) -> Option<String> {
        self.code
            .as_deref()
            .map(normalize_code)
            .filter(|c| !c.is_empty())
    }

    fn check_amounts(&self, errors: &mut FieldErrors) {
        let discount = self.discount.unwrap_or(Decimal::ZERO);
        let kind = self.coupon_type.unwrap_or_default();
        errors
            .check(discount >= Decimal::ZERO, "discount", "Discount cannot be negative")
            .check(
                kind != CouponType::Percentage || discount <= Decimal::ONE_HUNDRED,
                "discount",
                "Percentage discount cannot exceed 100",
            )
            .check(
                self.min_order_amount.is_none_or(|m| m >= Decimal::ZERO),
                "minOrderAmount",
                "Minimum order amount cannot be negative",
            );
    }

    /// Validate a create request.
    fn into_new(self) -> Result<NewCoupon> {
        let mut errors = FieldErrors::new();
        let code = self.code();
        errors
            .check(code.is_some(), "code", "Code is required")
            .check(self.discount.is_some(), "discount", "Discount is required")
            .check(self.expiry_date.is_some(), "expiryDate", "Expiry date is required");
        self.check_amounts(&mut errors);
        errors.into_result().map_err(invalid_coupon)?;

        let (Some(code), Some(discount), Some(expiry_date)) =
            (code, self.discount, self.expiry_date)
        else {
            return Err(AppError::BadRequest("Invalid coupon data".to_string()));
        };
        Ok(NewCoupon {
            code,
            discount,
            coupon_type: self.coupon_type.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            expiry_date,
            min_order_amount: self.min_order_amount.unwrap_or(Decimal::ZERO),
        })
    }

    /// Validate an update request. Absent fields keep their stored values.
    fn into_patch(self) -> Result<CouponPatch> {
        let mut errors = FieldErrors::new();
        if self.discount.is_some() {
            self.check_amounts(&mut errors);
        }
        errors.into_result().map_err(invalid_coupon)?;

        Ok(CouponPatch {
            code: self.code(),
            discount: self.discount,
            coupon_type: self.coupon_type,
            is_active: self.is_active,
            expiry_date: self.expiry_date,
            min_order_amount: self.min_order_amount,
        })
    }
}

fn invalid_coupon(errors: FieldErrors) -> AppError {
    AppError::Validation {
        message: "Invalid coupon data".to_string(),
        errors,
    }
}

fn duplicate_code(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::Conflict(_) => AppError::BadRequest("Coupon code already exists".to_string()),
        RepositoryError::NotFound => AppError::NotFound("Coupon not found".to_string()),
        other => AppError::Database(other),
    }
}

/// POST /api/coupons
///
/// # Errors
///
/// Returns 400 "Coupon code already exists" or a validation error.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(req): AppJson<CouponRequest>,
) -> Result<(StatusCode, AppJson<Coupon>)> {
    let new = req.into_new()?;
    let coupon = CouponRepository::new(state.pool())
        .create(&new)
        .await
        .map_err(duplicate_code)?;
    tracing::info!(coupon_id = %coupon.id, code = %coupon.code, admin_id = %admin.id, "Coupon created");
    Ok((StatusCode::CREATED, AppJson(coupon)))
}

/// PUT /api/coupons/{id}
///
/// # Errors
///
/// Returns 404 "Coupon not found" or 400 "Coupon code already exists".
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<CouponId>,
    AppJson(req): AppJson<CouponRequest>,
) -> Result<AppJson<Coupon>> {
    let patch = req.into_patch()?;
    let coupon = CouponRepository::new(state.pool())
        .update(id, &patch)
        .await
        .map_err(duplicate_code)?;
    Ok(AppJson(coupon))
}

/// DELETE /api/coupons/{id}
///
/// # Errors
///
/// Returns 404 "Coupon not found".
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<CouponId>,
) -> Result<AppJson<Value>> {
    if !CouponRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("Coupon not found".to_string()));
    }
    tracing::info!(coupon_id = %id, "Coupon removed");
    Ok(AppJson(json!({ "message": "Coupon removed" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> CouponRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_normalizes_code_and_defaults() {
        let new = request(
            r#"{"code": " welcome10 ", "discount": 10, "expiryDate": "2030-01-01T00:00:00Z"}"#,
        )
        .into_new()
        .unwrap();
        assert_eq!(new.code, "WELCOME10");
        assert_eq!(new.coupon_type, CouponType::Percentage);
        assert!(new.is_active);
        assert_eq!(new.min_order_amount, Decimal::ZERO);
    }

    #[test]
    fn test_create_requires_fields() {
        let Err(AppError::Validation { errors, .. }) = request(r#"{"code": "  "}"#).into_new()
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("code"), Some("Code is required"));
        assert_eq!(errors.get("discount"), Some("Discount is required"));
        assert_eq!(errors.get("expiryDate"), Some("Expiry date is required"));
    }

    #[test]
    fn test_percentage_over_100_rejected() {
        let result = request(
            r#"{"code": "BIG", "discount": 150, "type": "percentage", "expiryDate": "2030-01-01T00:00:00Z"}"#,
        )
        .into_new();
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let fixed = request(
            r#"{"code": "BIG", "discount": 150, "type": "fixed", "expiryDate": "2030-01-01T00:00:00Z"}"#,
        )
        .into_new()
        .unwrap();
        assert_eq!(fixed.coupon_type, CouponType::Fixed);
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let patch = request(r#"{"isActive": false}"#).into_patch().unwrap();
        assert_eq!(patch.is_active, Some(false));
        assert!(patch.code.is_none());
        assert!(patch.discount.is_none());
    }

    #[test]
    fn test_duplicate_code_message() {
        let err = duplicate_code(RepositoryError::Conflict("code".to_string()));
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Coupon code already exists"));
    }
}
