//! Order repository.
//!
//! Orders are written together with their lines in one transaction and read
//! back with lines attached.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hridved_core::{DeliveryOption, OrderId, OrderTotals, PaymentMethod, ProductId, UserId};

use super::RepositoryError;
use crate::models::{AdminOrder, Order, OrderItem, PaymentResult, ShipmentInfo, ShippingAddress};

const ORDER_COLUMNS: &str = "o.id, o.user_id, \
    o.ship_address_id, o.ship_full_name, o.ship_mobile_number, o.ship_house_number, \
    o.ship_landmark, o.ship_city, o.ship_state, o.ship_pincode, o.ship_address_type, \
    o.payment_method, o.payment_result_id, o.payment_result_status, \
    o.payment_result_update_time, o.payment_result_email, \
    o.razorpay_order_id, o.razorpay_payment_id, o.razorpay_signature, \
    o.shipment_id, o.tracking_id, o.courier_name, o.shipping_status, o.estimated_delivery, \
    o.delivery_option, o.estimated_delivery_days, \
    o.items_price, o.tax_price, o.shipping_price, o.discount_amount, o.total_price, \
    o.coupon_code, o.is_paid, o.paid_at, o.is_delivered, o.delivered_at, \
    o.created_at, o.updated_at";

/// A new order line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub qty: i32,
    pub image: String,
    pub price: rust_decimal::Decimal,
}

/// Everything needed to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub delivery_option: DeliveryOption,
    pub totals: OrderTotals,
    pub coupon_code: Option<String>,
}

/// Razorpay identifiers recorded with a payment.
#[derive(Debug, Clone, Default)]
pub struct RazorpayIds<'a> {
    pub order_id: Option<&'a str>,
    pub payment_id: Option<&'a str>,
    pub signature: Option<&'a str>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let ship = &order.shipping_address;

        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO hridved.orders (
                user_id,
                ship_address_id, ship_full_name, ship_mobile_number, ship_house_number,
                ship_landmark, ship_city, ship_state, ship_pincode, ship_address_type,
                payment_method, delivery_option, estimated_delivery_days,
                items_price, tax_price, shipping_price, discount_amount, total_price,
                coupon_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id
            ",
        )
        .bind(order.user_id)
        .bind(ship.address_id)
        .bind(&ship.full_name)
        .bind(&ship.mobile_number)
        .bind(&ship.house_number)
        .bind(&ship.landmark)
        .bind(&ship.city)
        .bind(&ship.state)
        .bind(&ship.pincode)
        .bind(ship.address_type)
        .bind(order.payment_method)
        .bind(order.delivery_option)
        .bind(order.delivery_option.days())
        .bind(order.totals.items_price)
        .bind(order.totals.tax_price)
        .bind(order.totals.shipping_price)
        .bind(order.totals.discount_amount)
        .bind(order.totals.total_price)
        .bind(order.coupon_code.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO hridved.order_items (order_id, product_id, name, qty, image, price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.qty)
            .bind(&item.image)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM hridved.orders o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match order {
            Some(mut order) => {
                order.order_items = self
                    .items_for(&[order.id])
                    .await?
                    .remove(&order.id)
                    .unwrap_or_default();
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM hridved.orders o WHERE o.user_id = $1 \
             ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut items = self.items_for(&ids).await?;
        for order in &mut orders {
            order.order_items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    /// Every order with the customer's name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let mut orders = sqlx::query_as::<_, AdminOrder>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS user_name
            FROM hridved.orders o
            LEFT JOIN hridved.users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = orders.iter().map(|o| o.order.id).collect();
        let mut items = self.items_for(&ids).await?;
        for row in &mut orders {
            row.order.order_items = items.remove(&row.order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    /// Mark an order paid with the gateway's confirmation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        result: &PaymentResult,
        razorpay: &RazorpayIds<'_>,
        paid_at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE hridved.orders
            SET is_paid = TRUE,
                paid_at = $2,
                payment_result_id = COALESCE($3, payment_result_id),
                payment_result_status = COALESCE($4, payment_result_status),
                payment_result_update_time = COALESCE($5, payment_result_update_time),
                payment_result_email = COALESCE($6, payment_result_email),
                razorpay_order_id = COALESCE($7, razorpay_order_id),
                razorpay_payment_id = COALESCE($8, razorpay_payment_id),
                razorpay_signature = COALESCE($9, razorpay_signature),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(paid_at)
        .bind(result.id.as_deref())
        .bind(result.status.as_deref())
        .bind(result.update_time.as_deref())
        .bind(result.email_address.as_deref())
        .bind(razorpay.order_id)
        .bind(razorpay.payment_id)
        .bind(razorpay.signature)
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Mark an order delivered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE hridved.orders
            SET is_delivered = TRUE,
                delivered_at = NOW(),
                shipping_status = 'Delivered',
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Record an FShip shipment and move the order to `Shipped`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_shipment(
        &self,
        id: OrderId,
        shipment: &ShipmentInfo,
    ) -> Result<Order, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE hridved.orders
            SET shipment_id = $2,
                tracking_id = $3,
                courier_name = $4,
                shipping_status = 'Shipped',
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&shipment.shipment_id)
        .bind(shipment.tracking_id.as_deref())
        .bind(shipment.courier_name.as_deref())
        .execute(self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn items_for(
        &self,
        ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw: Vec<i32> = ids.iter().map(OrderId::as_i32).collect();

        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT order_id, product_id, name, qty, image, price
            FROM hridved.order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.item);
        }
        Ok(grouped)
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    item: OrderItem,
}
