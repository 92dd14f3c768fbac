//! Razorpay checkout flow (`/api/checkout`).
//!
//! The storefront creates the order here, collects payment in the Razorpay
//! widget, then confirms it with the gateway ids.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hridved_core::{AddressId, OrderId, PaymentMethod};

use crate::db::orders::RazorpayIds;
use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAuth;
use crate::models::{Order, PaymentResult};
use crate::routes::orders::{parse_delivery_option, visible_order};
use crate::services::checkout::{self, OrderLine, PlaceOrder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub address_id: Option<AddressId>,
    pub delivery_option: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    /// Accepted for compatibility; the subtotal is always recomputed.
    pub items_price: Option<Decimal>,
    pub shipping_price: Option<Decimal>,
    pub coupon_code: Option<String>,
}

/// POST /api/checkout/create-order
///
/// # Errors
///
/// Returns 400 "Missing required fields" or "Invalid delivery option", 404
/// for an unknown address, 403 for someone else's address.
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, AppJson<Order>)> {
    let (Some(address_id), Some(option)) = (req.address_id, req.delivery_option.as_deref())
    else {
        return Err(missing_fields());
    };
    if req.order_items.is_empty() || option.trim().is_empty() {
        return Err(missing_fields());
    }

    let order = checkout::place_order(
        state.pool(),
        user.id,
        PlaceOrder {
            address_id,
            delivery_option: parse_delivery_option(Some(option))?,
            payment_method: PaymentMethod::Razorpay,
            lines: req.order_items,
            quoted_shipping: req.shipping_price,
            coupon_code: req.coupon_code,
        },
    )
    .await?;

    if let Some(claimed) = req.items_price
        && claimed != order.items_price
    {
        tracing::debug!(order_id = %order.id, %claimed, actual = %order.items_price, "Client subtotal differs");
    }

    Ok((StatusCode::CREATED, AppJson(order)))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn missing_fields() -> AppError {
    AppError::BadRequest("Missing required fields".to_string())
}

/// GET /api/checkout/order/{id}
///
/// # Errors
///
/// Returns 404 "Order not found" or 403 "Not authorized to view this order".
pub async fn show_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<OrderId>,
) -> Result<AppJson<Order>> {
    let order = visible_order(&state, &user, id, "Not authorized to view this order").await?;
    Ok(AppJson(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub order: Order,
    pub message: &'static str,
}

/// PUT /api/checkout/confirm-payment/{id}
///
/// # Errors
///
/// Returns 400 "Payment details missing", 404 or 403.
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<OrderId>,
    AppJson(req): AppJson<ConfirmPaymentRequest>,
) -> Result<AppJson<ConfirmPaymentResponse>> {
    let (Some(payment_id), Some(razorpay_order_id)) = (
        present(req.razorpay_payment_id.as_deref()),
        present(req.razorpay_order_id.as_deref()),
    ) else {
        return Err(AppError::BadRequest("Payment details missing".to_string()));
    };

    let order = visible_order(&state, &user, id, "Not authorized to update this order").await?;
    if order.user_id != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to update this order".to_string(),
        ));
    }

    let now = Utc::now();
    let result = PaymentResult {
        id: Some(payment_id.to_string()),
        status: Some("completed".to_string()),
        update_time: Some(now.to_rfc3339()),
        email_address: Some(user.email.to_string()),
    };
    let ids = RazorpayIds {
        order_id: Some(razorpay_order_id),
        payment_id: Some(payment_id),
        signature: present(req.razorpay_signature.as_deref()),
    };
    let order = OrderRepository::new(state.pool())
        .mark_paid(id, &result, &ids, now)
        .await?;
    tracing::info!(order_id = %id, user_id = %user.id, "Checkout payment confirmed");

    if let Err(e) = CartRepository::new(state.pool())
        .delete_for_user(user.id)
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to clear cart after payment");
    }

    Ok(AppJson(ConfirmPaymentResponse {
        success: true,
        order,
        message: "Payment confirmed and order created successfully",
    }))
}
