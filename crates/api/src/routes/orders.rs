//! Order routes (`/api/orders`).

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use hridved_core::{AddressId, DeliveryOption, OrderId, PaymentMethod};

use crate::db::OrderRepository;
use crate::db::orders::RazorpayIds;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{AdminOrder, Order, PaymentResult, User};
use crate::services::checkout::{self, OrderLine, PlaceOrder};
use crate::state::AppState;

/// Load an order that `user` may see: their own, or any order for an admin.
pub(crate) async fn visible_order(
    state: &AppState,
    user: &User,
    id: OrderId,
    forbidden: &str,
) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::Forbidden(forbidden.to_string()));
    }
    Ok(order)
}

/// Parse a delivery option label, defaulting to Standard when absent.
pub(crate) fn parse_delivery_option(value: Option<&str>) -> Result<DeliveryOption> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DeliveryOption::Standard),
        Some(label) => label
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid delivery option".to_string())),
    }
}

fn parse_payment_method(value: Option<&str>) -> Result<PaymentMethod> {
    let label = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid_field("paymentMethod", "Payment method is required"))?;
    serde_json::from_value(serde_json::Value::String(label.to_string()))
        .map_err(|_| AppError::invalid_field("paymentMethod", "Invalid payment method"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    pub address_id: Option<AddressId>,
    pub delivery_option: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_price: Option<Decimal>,
    pub coupon_code: Option<String>,
}

/// POST /api/orders
///
/// # Errors
///
/// Returns 400 "No order items", 404/403 for the address, or a coupon error.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, AppJson<Order>)> {
    if req.order_items.is_empty() {
        return Err(AppError::BadRequest("No order items".to_string()));
    }
    let address_id = req
        .address_id
        .ok_or_else(|| AppError::invalid_field("addressId", "Shipping address is required"))?;

    let order = checkout::place_order(
        state.pool(),
        user.id,
        PlaceOrder {
            address_id,
            delivery_option: parse_delivery_option(req.delivery_option.as_deref())?,
            payment_method: parse_payment_method(req.payment_method.as_deref())?,
            lines: req.order_items,
            quoted_shipping: req.shipping_price,
            coupon_code: req.coupon_code,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, AppJson(order)))
}

/// GET /api/orders/mine
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(AppJson(orders))
}

/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns 404 "Order not found" or 403 for someone else's order.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<OrderId>,
) -> Result<AppJson<Order>> {
    let order = visible_order(&state, &user, id, "Not authorized to view this order").await?;
    Ok(AppJson(order))
}

/// PUT /api/orders/{id}/pay
///
/// Records a client-side gateway confirmation (`paymentResult`).
///
/// # Errors
///
/// Returns 404 "Order not found" or 403 for someone else's order.
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<OrderId>,
    AppJson(result): AppJson<PaymentResult>,
) -> Result<AppJson<Order>> {
    visible_order(&state, &user, id, "Not authorized to pay for this order").await?;

    let order = OrderRepository::new(state.pool())
        .mark_paid(id, &result, &RazorpayIds::default(), Utc::now())
        .await?;
    tracing::info!(order_id = %id, user_id = %user.id, "Order marked paid");
    Ok(AppJson(order))
}

/// PUT /api/orders/{id}/deliver
///
/// # Errors
///
/// Returns 404 "Order not found".
pub async fn deliver(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<OrderId>,
) -> Result<AppJson<Order>> {
    let order = OrderRepository::new(state.pool())
        .mark_delivered(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Order not found".to_string())
            }
            other => other.into(),
        })?;
    tracing::info!(order_id = %id, admin_id = %admin.id, "Order delivered");
    Ok(AppJson(order))
}

/// GET /api/orders
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<AppJson<Vec<AdminOrder>>> {
    Ok(AppJson(OrderRepository::new(state.pool()).list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delivery_option() {
        assert!(matches!(
            parse_delivery_option(None),
            Ok(DeliveryOption::Standard)
        ));
        assert!(matches!(
            parse_delivery_option(Some("Express")),
            Ok(DeliveryOption::Express)
        ));
        assert!(matches!(
            parse_delivery_option(Some("Overnight")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_payment_method() {
        assert!(matches!(
            parse_payment_method(Some("COD")),
            Ok(PaymentMethod::Cod)
        ));
        assert!(matches!(
            parse_payment_method(Some("PhonePe")),
            Ok(PaymentMethod::PhonePe)
        ));
        assert!(parse_payment_method(Some("Cash")).is_err());
        assert!(parse_payment_method(None).is_err());
    }
}
