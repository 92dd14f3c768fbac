//! Persistent per-user carts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::{CartId, ProductId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub name: String,
    pub qty: i32,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[sqlx(skip)]
    pub cart_items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
