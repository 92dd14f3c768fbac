//! Admin dashboard route (`/api/admin/stats`).

use axum::extract::State;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hridved_core::format_inr;

use crate::db::StatsRepository;
use crate::db::stats::{LowStock, MonthBucket, RecentOrder};
use crate::error::Result;
use crate::extract::AppJson;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Months shown in the revenue chart, current month included.
const CHART_MONTHS: i32 = 6;
/// Products with fewer units than this count as low stock.
const LOW_STOCK_BELOW: i32 = 20;
const LOW_STOCK_LIMIT: i64 = 5;
const RECENT_ORDER_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub active_orders: i64,
    pub total_customers: i64,
    pub total_consultations: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Serialize)]
pub struct LowStockRow {
    pub name: String,
    pub sku: String,
    pub left: i32,
}

impl From<LowStock> for LowStockRow {
    fn from(product: LowStock) -> Self {
        Self {
            sku: format!("SKU-{:06}", product.id.as_i32()),
            name: product.name,
            left: product.count_in_stock,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrderRow {
    pub id: String,
    pub name: String,
    pub product: String,
    pub date: String,
    pub amount: String,
    pub status: &'static str,
    pub is_paid: bool,
    pub is_delivered: bool,
}

impl From<RecentOrder> for RecentOrderRow {
    fn from(order: RecentOrder) -> Self {
        let mut product = order.first_item.unwrap_or_default();
        if order.item_count > 1 {
            product.push_str(&format!(" + {} more", order.item_count - 1));
        }
        let status = if order.is_delivered {
            "Delivered"
        } else if order.is_paid {
            "Paid"
        } else {
            "Pending"
        };

        Self {
            id: format!("#{:08}", order.id.as_i32()),
            name: order.user_name.unwrap_or_else(|| "Guest".to_string()),
            product,
            date: order.created_at.format("%-d %b %Y").to_string(),
            amount: format_inr(order.total_price),
            status,
            is_paid: order.is_paid,
            is_delivered: order.is_delivered,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub monthly_data: Vec<MonthlyPoint>,
    pub low_stock_products: Vec<LowStockRow>,
    pub recent_orders: Vec<RecentOrderRow>,
}

/// First day of each of the last `count` calendar months, oldest first.
fn month_starts(now: DateTime<Utc>, count: i32) -> Vec<NaiveDate> {
    let current = now.year() * 12 + i32::try_from(now.month0()).unwrap_or_default();
    (0..count)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
            NaiveDate::from_ymd_opt(index.div_euclid(12), month, 1)
        })
        .collect()
}

/// One chart point per month; months with no paid orders are zero.
fn monthly_data(starts: &[NaiveDate], buckets: &[MonthBucket]) -> Vec<MonthlyPoint> {
    starts
        .iter()
        .map(|start| {
            let bucket = buckets.iter().find(|b| b.month.date_naive() == *start);
            MonthlyPoint {
                month: start.format("%b").to_string(),
                revenue: bucket.map_or(Decimal::ZERO, |b| b.revenue),
                orders: bucket.map_or(0, |b| b.orders),
            }
        })
        .collect()
}

/// GET /api/admin/stats
///
/// # Errors
///
/// Returns 500 if any dashboard query fails.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<AppJson<DashboardResponse>> {
    let repo = StatsRepository::new(state.pool());
    let starts = month_starts(Utc::now(), CHART_MONTHS);
    let since = starts
        .first()
        .map_or_else(Utc::now, |d| d.and_time(chrono::NaiveTime::MIN).and_utc());

    let totals = repo.totals().await?;
    let buckets = repo.monthly_paid(since).await?;
    let low_stock = repo.low_stock(LOW_STOCK_BELOW, LOW_STOCK_LIMIT).await?;
    let recent = repo.recent_orders(RECENT_ORDER_LIMIT).await?;

    Ok(AppJson(DashboardResponse {
        stats: DashboardStats {
            total_revenue: totals.revenue,
            active_orders: totals.orders,
            total_customers: totals.customers,
            total_consultations: totals.consultations,
        },
        monthly_data: monthly_data(&starts, &buckets),
        low_stock_products: low_stock.into_iter().map(LowStockRow::from).collect(),
        recent_orders: recent.into_iter().map(RecentOrderRow::from).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hridved_core::{OrderId, ProductId};

    #[test]
    fn test_month_starts_cross_year() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).unwrap();
        let labels: Vec<String> = month_starts(now, 6)
            .iter()
            .map(|d| d.format("%Y-%m").to_string())
            .collect();
        assert_eq!(
            labels,
            ["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]
        );
    }

    #[test]
    fn test_monthly_data_fills_gaps() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let starts = month_starts(now, 6);
        let buckets = vec![MonthBucket {
            month: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            revenue: Decimal::new(12_500, 0),
            orders: 3,
        }];
        let points = monthly_data(&starts, &buckets);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].month, "May");
        assert_eq!(points[4].month, "Sep");
        assert_eq!(points[4].orders, 3);
        assert_eq!(points[5].revenue, Decimal::ZERO);
    }

    #[test]
    fn test_low_stock_sku() {
        let row = LowStockRow::from(LowStock {
            id: ProductId::new(42),
            name: "Ashwagandha".to_string(),
            count_in_stock: 7,
        });
        assert_eq!(row.sku, "SKU-000042");
        assert_eq!(row.left, 7);
    }

    #[test]
    fn test_recent_order_row() {
        let row = RecentOrderRow::from(RecentOrder {
            id: OrderId::new(315),
            user_name: None,
            first_item: Some("Triphala".to_string()),
            item_count: 3,
            created_at: Utc.with_ymd_and_hms(2026, 10, 6, 12, 0, 0).unwrap(),
            total_price: Decimal::new(123_456, 0),
            is_paid: true,
            is_delivered: false,
        });
        assert_eq!(row.id, "#00000315");
        assert_eq!(row.name, "Guest");
        assert_eq!(row.product, "Triphala + 2 more");
        assert_eq!(row.date, "6 Oct 2026");
        assert_eq!(row.amount, "₹1,23,456");
        assert_eq!(row.status, "Paid");
    }
}
