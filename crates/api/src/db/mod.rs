//! Database operations for the API `PostgreSQL` database.
//!
//! # Schema: `hridved`
//!
//! ## Tables
//!
//! - `users` - Accounts (password or OAuth), admin flag
//! - `categories`, `products`, `product_reviews`, `user_wishlist` - Catalog
//! - `carts`, `cart_items` - One persistent cart per user
//! - `addresses` - Saved delivery addresses
//! - `orders`, `order_items` - Orders with an address snapshot
//! - `coupons` - Promo codes
//! - `transactions` - PhonePe payment attempts
//! - `blogs`, `content_sections`, `about_page`, `tips`, `contacts` - Site content
//! - `doctors`, `doctor_bookings` - Consultations
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p hridved-cli -- migrate
//! ```

pub mod addresses;
pub mod blogs;
pub mod bookings;
pub mod carts;
pub mod categories;
pub mod contacts;
pub mod content;
pub mod coupons;
pub mod doctors;
pub mod orders;
pub mod products;
pub mod stats;
pub mod tips;
pub mod transactions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use blogs::BlogRepository;
pub use bookings::BookingRepository;
pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use contacts::ContactRepository;
pub use content::ContentRepository;
pub use coupons::CouponRepository;
pub use doctors::DoctorRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use stats::StatsRepository;
pub use tips::TipRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; carries the camelCase field name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error, turning unique violations into `Conflict`.
    ///
    /// Constraint names follow `{table}_{column}_key`, so `users_email_key`
    /// becomes `email` and `transactions_merchant_transaction_id_key`
    /// becomes `merchantTransactionId`.
    #[must_use]
    pub fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            let field = db_err
                .constraint()
                .map(|c| constraint_field(c, db_err.table()))
                .unwrap_or_else(|| "value".to_string());
            return Self::Conflict(field);
        }
        Self::Database(e)
    }
}

fn constraint_field(constraint: &str, table: Option<&str>) -> String {
    let mut name = constraint.strip_suffix("_key").unwrap_or(constraint);
    if let Some(rest) = table.and_then(|t| name.strip_prefix(t)) {
        name = rest.trim_start_matches('_');
    }
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("users_email_key", Some("users")), "email");
        assert_eq!(constraint_field("coupons_code_key", Some("coupons")), "code");
        assert_eq!(
            constraint_field("transactions_merchant_transaction_id_key", Some("transactions")),
            "merchantTransactionId"
        );
        assert_eq!(
            constraint_field("product_reviews_product_user_key", Some("product_reviews")),
            "productUser"
        );
        assert_eq!(constraint_field("blogs_slug_key", None), "blogsSlug");
    }
}
