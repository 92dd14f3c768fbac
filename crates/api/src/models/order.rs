//! Orders, order lines and the address snapshot taken at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hridved_core::{
    AddressId, AddressType, DeliveryOption, OrderId, PaymentMethod, ProductId, ShippingStatus,
    UserId,
};

use super::Address;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub qty: i32,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "product")]
    pub product_id: ProductId,
}

/// Delivery address copied onto the order so later edits don't change it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[sqlx(rename = "ship_address_id")]
    pub address_id: Option<AddressId>,
    #[sqlx(rename = "ship_full_name")]
    pub full_name: String,
    #[sqlx(rename = "ship_mobile_number")]
    pub mobile_number: String,
    #[sqlx(rename = "ship_house_number")]
    pub house_number: String,
    #[sqlx(rename = "ship_landmark")]
    pub landmark: String,
    #[sqlx(rename = "ship_city")]
    pub city: String,
    #[sqlx(rename = "ship_state")]
    pub state: String,
    #[sqlx(rename = "ship_pincode")]
    pub pincode: String,
    #[sqlx(rename = "ship_address_type")]
    pub address_type: AddressType,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            address_id: Some(address.id),
            full_name: address.full_name.clone(),
            mobile_number: address.mobile_number.clone(),
            house_number: address.house_number.clone(),
            landmark: address.landmark.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            address_type: address.address_type,
        }
    }
}

/// Gateway confirmation stored when an order is paid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentResult {
    #[sqlx(rename = "payment_result_id")]
    pub id: Option<String>,
    #[sqlx(rename = "payment_result_status")]
    pub status: Option<String>,
    #[sqlx(rename = "payment_result_update_time")]
    pub update_time: Option<String>,
    #[sqlx(rename = "payment_result_email")]
    pub email_address: Option<String>,
}

/// Courier details recorded once FShip accepts a shipment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentInfo {
    pub shipment_id: String,
    pub tracking_id: Option<String>,
    pub courier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[sqlx(skip)]
    pub order_items: Vec<OrderItem>,
    #[sqlx(flatten)]
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[sqlx(flatten)]
    pub payment_result: PaymentResult,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub shipment_id: Option<String>,
    pub tracking_id: Option<String>,
    pub courier_name: Option<String>,
    pub shipping_status: ShippingStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub delivery_option: DeliveryOption,
    pub estimated_delivery_days: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub items_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub coupon_code: Option<String>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Amount FShip should collect on delivery.
    #[must_use]
    pub fn cod_amount(&self) -> Decimal {
        if self.payment_method == PaymentMethod::Cod {
            self.total_price
        } else {
            Decimal::ZERO
        }
    }
}

/// An order in the admin listing, with the customer's name attached.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub user_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A prepaid, unshipped order for two units of product 5.
    pub(crate) fn sample_order() -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(42),
            user_id: UserId::new(7),
            order_items: vec![OrderItem {
                name: "Kumkumadi Tailam".to_string(),
                qty: 2,
                image: "/images/kumkumadi.jpg".to_string(),
                price: Decimal::new(500, 0),
                product_id: ProductId::new(5),
            }],
            shipping_address: ShippingAddress {
                address_id: Some(AddressId::new(3)),
                full_name: "Asha Verma".to_string(),
                mobile_number: "9876543210".to_string(),
                house_number: "12 MG Road".to_string(),
                landmark: "Near City Park".to_string(),
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560001".to_string(),
                address_type: AddressType::Home,
            },
            payment_method: PaymentMethod::Razorpay,
            payment_result: PaymentResult::default(),
            razorpay_order_id: None,
            razorpay_payment_id: None,
            razorpay_signature: None,
            shipment_id: None,
            tracking_id: None,
            courier_name: None,
            shipping_status: ShippingStatus::Processing,
            estimated_delivery: None,
            delivery_option: DeliveryOption::Standard,
            estimated_delivery_days: "3-5".to_string(),
            items_price: Decimal::new(1000, 0),
            tax_price: Decimal::new(50, 0),
            shipping_price: Decimal::new(40, 0),
            discount_amount: Decimal::ZERO,
            total_price: Decimal::new(1090, 0),
            coupon_code: None,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cod_amount() {
        let mut order = sample_order();
        assert_eq!(order.cod_amount(), Decimal::ZERO);
        order.payment_method = PaymentMethod::Cod;
        assert_eq!(order.cod_amount(), Decimal::new(1090, 0));
    }

    #[test]
    fn test_order_json_shape() {
        let json = serde_json::to_value(sample_order()).unwrap();
        assert_eq!(json["_id"], 42);
        assert_eq!(json["user"], 7);
        assert_eq!(json["orderItems"][0]["product"], 5);
        assert_eq!(json["shippingAddress"]["fullName"], "Asha Verma");
        assert_eq!(json["paymentResult"]["email_address"], serde_json::Value::Null);
        assert_eq!(json["totalPrice"], 1090.0);
        assert_eq!(json["shippingStatus"], "Processing");
    }
}
