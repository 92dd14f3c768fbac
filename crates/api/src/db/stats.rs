//! Aggregate queries behind the admin dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use hridved_core::{OrderId, ProductId};

use super::RepositoryError;

/// Headline counters.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct Totals {
    pub revenue: Decimal,
    pub orders: i64,
    pub customers: i64,
    pub consultations: i64,
}

/// Paid revenue and order count for one calendar month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthBucket {
    /// First instant of the month (UTC).
    pub month: DateTime<Utc>,
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStock {
    pub id: ProductId,
    pub name: String,
    pub count_in_stock: i32,
}

/// One of the most recent orders with what the dashboard table shows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentOrder {
    pub id: OrderId,
    pub user_name: Option<String>,
    pub first_item: Option<String>,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub is_delivered: bool,
}

pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<Totals, RepositoryError> {
        let totals = sqlx::query_as::<_, Totals>(
            r"
            SELECT
                (SELECT COALESCE(SUM(total_price), 0) FROM hridved.orders WHERE is_paid) AS revenue,
                (SELECT COUNT(*) FROM hridved.orders) AS orders,
                (SELECT COUNT(*) FROM hridved.users) AS customers,
                (SELECT COUNT(*) FROM hridved.doctor_bookings) AS consultations
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(totals)
    }

    /// Paid orders grouped by month, for months starting at or after `since`.
    ///
    /// Months without paid orders are absent; the caller fills the gaps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_paid(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthBucket>, RepositoryError> {
        let buckets = sqlx::query_as::<_, MonthBucket>(
            r"
            SELECT date_trunc('month', created_at, 'UTC') AS month,
                   COALESCE(SUM(total_price), 0) AS revenue,
                   COUNT(*) AS orders
            FROM hridved.orders
            WHERE is_paid AND created_at >= $1
            GROUP BY 1
            ORDER BY 1
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(buckets)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, below: i32, limit: i64) -> Result<Vec<LowStock>, RepositoryError> {
        let products = sqlx::query_as::<_, LowStock>(
            r"
            SELECT id, name, count_in_stock
            FROM hridved.products
            WHERE count_in_stock < $1
            ORDER BY count_in_stock ASC, id ASC
            LIMIT $2
            ",
        )
        .bind(below)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_orders(&self, limit: i64) -> Result<Vec<RecentOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, RecentOrder>(
            r"
            SELECT o.id,
                   u.name AS user_name,
                   (SELECT i.name FROM hridved.order_items i
                    WHERE i.order_id = o.id ORDER BY i.id LIMIT 1) AS first_item,
                   (SELECT COUNT(*) FROM hridved.order_items i WHERE i.order_id = o.id) AS item_count,
                   o.created_at,
                   o.total_price,
                   o.is_paid,
                   o.is_delivered
            FROM hridved.orders o
            LEFT JOIN hridved.users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }
}
