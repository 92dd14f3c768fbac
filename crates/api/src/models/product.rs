//! Catalog: products, reviews and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::{CategoryId, ProductId, ReviewId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Admin who created the product.
    #[serde(rename = "user")]
    pub user_id: Option<UserId>,
    pub name: String,
    pub image: String,
    pub images: Vec<String>,
    pub brand: String,
    pub category: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub is_bestseller: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(skip)]
    pub product_id: ProductId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    pub name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A product with its reviews, as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
