//! Order placement and post-payment fulfilment shared by the checkout,
//! orders and payment routes.
//!
//! Totals are always recomputed here from the submitted lines; a client's
//! `itemsPrice` is never stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};

use hridved_core::pricing::{items_price, shipping_charge};
use hridved_core::validation::{MAX_PRICE, is_valid_quantity};
use hridved_core::{
    AddressId, CouponRejection, DeliveryOption, FieldErrors, OrderTotals, PaymentMethod, ProductId,
    UserId,
};

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::db::{AddressRepository, CouponRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::coupon::normalize_code;
use crate::models::{Coupon, Order, ShippingAddress};
use crate::services::fship::{FshipClient, ShipmentOutcome, shipment_info};

/// One submitted order line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: ProductId,
    pub name: String,
    pub qty: i64,
    #[serde(default)]
    pub image: String,
    pub price: Decimal,
}

/// A validated request to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub address_id: AddressId,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    pub lines: Vec<OrderLine>,
    /// Shipping charge quoted to the customer, capped at the option's flat charge.
    pub quoted_shipping: Option<Decimal>,
    pub coupon_code: Option<String>,
}

/// Turn submitted lines into order items, checking quantity and price.
///
/// # Errors
///
/// Returns `AppError::Validation` naming the first offending line.
pub fn order_items(lines: &[OrderLine]) -> Result<Vec<NewOrderItem>> {
    let mut errors = FieldErrors::new();
    let mut items = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        errors.check(
            is_valid_quantity(line.qty),
            &format!("orderItems[{index}].qty"),
            "Quantity must be between 1 and 10000",
        );
        errors.check(
            line.price >= Decimal::ZERO && line.price < MAX_PRICE,
            &format!("orderItems[{index}].price"),
            "Price must be between 0 and 999999",
        );
        errors.check(
            !line.name.trim().is_empty(),
            &format!("orderItems[{index}].name"),
            "Item name is required",
        );
        if let Ok(qty) = i32::try_from(line.qty) {
            items.push(NewOrderItem {
                product_id: line.product,
                name: line.name.trim().to_string(),
                qty,
                image: line.image.clone(),
                price: line.price,
            });
        }
    }

    errors.into_result().map_err(|errors| AppError::Validation {
        message: "Invalid order items".to_string(),
        errors,
    })?;
    Ok(items)
}

/// Map a coupon rule failure to its HTTP error.
#[must_use]
pub fn coupon_error(rejection: &CouponRejection) -> AppError {
    match rejection {
        CouponRejection::Inactive => AppError::NotFound(rejection.to_string()),
        CouponRejection::Expired | CouponRejection::BelowMinimum { .. } => {
            AppError::BadRequest(rejection.to_string())
        }
    }
}

/// Compute an order's totals, applying `coupon` to the item subtotal.
///
/// # Errors
///
/// Returns the coupon's rejection when it doesn't apply to this subtotal.
pub fn price_order(
    items: &[NewOrderItem],
    option: DeliveryOption,
    quoted_shipping: Option<Decimal>,
    coupon: Option<&Coupon>,
    now: DateTime<Utc>,
) -> std::result::Result<OrderTotals, CouponRejection> {
    let subtotal = items_price(items.iter().map(|item| (item.price, item.qty)));
    let shipping = shipping_charge(option, quoted_shipping);

    let discount = match coupon {
        Some(coupon) => {
            let terms = coupon.terms();
            terms.check(subtotal, now)?;
            terms.discount_on(subtotal)
        }
        None => Decimal::ZERO,
    };

    Ok(OrderTotals::compute(subtotal, shipping, discount))
}

/// Look up a submitted promo code.
///
/// # Errors
///
/// Returns `AppError::NotFound` when no active coupon has this code.
pub async fn find_coupon(pool: &PgPool, code: &str) -> Result<Coupon> {
    CouponRepository::new(pool)
        .find_active(&normalize_code(code))
        .await?
        .ok_or_else(|| coupon_error(&CouponRejection::Inactive))
}

/// Place an order for `user_id` from a saved address.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the address or coupon doesn't exist.
/// Returns `AppError::Forbidden` if the address belongs to someone else.
/// Returns `AppError::Validation` for bad lines, or a coupon rule error.
pub async fn place_order(pool: &PgPool, user_id: UserId, request: PlaceOrder) -> Result<Order> {
    let address = AddressRepository::new(pool)
        .get_by_id(request.address_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;
    if address.user_id != user_id {
        return Err(AppError::Forbidden(
            "Not authorized to use this address".to_string(),
        ));
    }

    let items = order_items(&request.lines)?;

    let coupon = match request
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        Some(code) => Some(find_coupon(pool, code).await?),
        None => None,
    };

    let totals = price_order(
        &items,
        request.delivery_option,
        request.quoted_shipping,
        coupon.as_ref(),
        Utc::now(),
    )
    .map_err(|rejection| coupon_error(&rejection))?;

    let order = OrderRepository::new(pool)
        .create(&NewOrder {
            user_id,
            items,
            shipping_address: ShippingAddress::from(&address),
            payment_method: request.payment_method,
            delivery_option: request.delivery_option,
            totals,
            coupon_code: coupon.map(|c| c.code),
        })
        .await?;

    info!(
        order_id = %order.id,
        user_id = %user_id,
        total = %order.total_price,
        payment_method = ?order.payment_method,
        "Order placed"
    );
    Ok(order)
}

/// Book an FShip shipment for a freshly paid order.
///
/// Failures are logged and swallowed: payment confirmation never depends
/// on the courier.
pub async fn ship_paid_order(pool: &PgPool, fship: &FshipClient, order: &Order) {
    let response = match fship.create_order(order).await {
        Ok(ShipmentOutcome::Submitted(response)) => response,
        Ok(ShipmentOutcome::Already) => return,
        Err(e) => {
            error!(order_id = %order.id, error = %e, "Failed to auto-create shipment");
            return;
        }
    };

    let Some(shipment) = shipment_info(&response) else {
        warn!(order_id = %order.id, response = %response, "FShip did not accept shipment");
        return;
    };

    match OrderRepository::new(pool).set_shipment(order.id, &shipment).await {
        Ok(_) => info!(
            order_id = %order.id,
            shipment_id = %shipment.shipment_id,
            "Auto-shipment created"
        ),
        Err(e) => error!(order_id = %order.id, error = %e, "Failed to record shipment"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use hridved_core::{CouponId, CouponType};

    use super::*;

    fn line(qty: i64, price: &str) -> OrderLine {
        OrderLine {
            product: ProductId::new(5),
            name: "Brahmi Vati".to_string(),
            qty,
            image: String::new(),
            price: price.parse().unwrap(),
        }
    }

    fn coupon(kind: CouponType, discount: i64, min: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(1),
            code: "WELCOME10".to_string(),
            discount: Decimal::from(discount),
            coupon_type: kind,
            is_active: true,
            expiry_date: now + Duration::days(30),
            min_order_amount: Decimal::from(min),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_order_items_valid() {
        let items = order_items(&[line(2, "249.50"), line(1, "120")]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].qty, 2);
    }

    #[test]
    fn test_order_items_rejects_bad_qty_and_price() {
        let Err(AppError::Validation { errors, .. }) =
            order_items(&[line(0, "10"), line(1, "-1")])
        else {
            panic!("expected validation error");
        };
        assert!(errors.get("orderItems[0].qty").is_some());
        assert!(errors.get("orderItems[1].price").is_some());
    }

    #[test]
    fn test_price_order_recomputes_from_lines() {
        let items = order_items(&[line(2, "500")]).unwrap();
        let totals = price_order(&items, DeliveryOption::Standard, None, None, Utc::now()).unwrap();
        assert_eq!(totals.items_price, Decimal::from(1000));
        assert_eq!(totals.tax_price, Decimal::from(50));
        assert_eq!(totals.shipping_price, Decimal::from(40));
        assert_eq!(totals.total_price, Decimal::from(1090));
    }

    #[test]
    fn test_price_order_caps_quoted_shipping() {
        let items = order_items(&[line(1, "100")]).unwrap();
        let totals = price_order(
            &items,
            DeliveryOption::Express,
            Some(Decimal::from(250)),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(totals.shipping_price, Decimal::from(100));
    }

    #[test]
    fn test_price_order_with_coupon() {
        let items = order_items(&[line(2, "500")]).unwrap();
        let c = coupon(CouponType::Percentage, 10, 0);
        let totals =
            price_order(&items, DeliveryOption::Standard, None, Some(&c), Utc::now()).unwrap();
        assert_eq!(totals.discount_amount, Decimal::from(100));
        assert_eq!(totals.total_price, Decimal::from(990));
    }

    #[test]
    fn test_price_order_coupon_minimum() {
        let items = order_items(&[line(1, "100")]).unwrap();
        let c = coupon(CouponType::Fixed, 50, 499);
        let err = price_order(&items, DeliveryOption::Standard, None, Some(&c), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CouponRejection::BelowMinimum { .. }));
    }

    #[test]
    fn test_coupon_error_status() {
        assert!(matches!(
            coupon_error(&CouponRejection::Inactive),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            coupon_error(&CouponRejection::Expired),
            AppError::BadRequest(_)
        ));
    }
}
