//! # Analytics Repository
//!
//! Read-only aggregates for the dashboard. Nothing here mutates state, and
//! nothing here fails on "no data": empty windows and zero divisors resolve
//! to zeros in estok-core's derivations.
//!
//! ## Exactness
//! Profit and stock valuations multiply cents by milliunit quantities. The
//! SQL sums the raw cents-milliunit numerators and the reduction to cents
//! happens once, in Rust, so multi-line aggregates carry no per-row rounding
//! drift.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use estok_core::analytics::{
    self, DashboardWindows, ReorderAlert, VelocityInput, TOP_PRODUCTS_LIMIT,
};

/// Aggregates for one dashboard time window.
#[derive(Debug, Clone)]
pub struct WindowSummary {
    pub window_start: DateTime<Utc>,
    pub total_sales_cents: i64,
    pub profit_cents: i64,
    pub sale_count: i64,
    pub average_ticket_cents: i64,
}

/// The three standard dashboard windows.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub today: WindowSummary,
    pub last_7_days: WindowSummary,
    pub month_to_date: WindowSummary,
}

/// One row of the top-sellers ranking.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: String,
    pub description: String,
    pub quantity_sold_milli: i64,
}

/// Book-value snapshot over active products.
#[derive(Debug, Clone)]
pub struct InventorySummary {
    pub product_count: i64,
    pub total_quantity_milli: i64,
    pub stock_cost_value_cents: i64,
    pub stock_sale_value_cents: i64,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Sales/profit summary for today, the trailing 7 days, and the current
    /// month to date, relative to `now`.
    pub async fn dashboard_summary(&self, now: DateTime<Utc>) -> DbResult<DashboardSummary> {
        let windows = DashboardWindows::at(now);

        debug!(%now, "Computing dashboard summary");

        Ok(DashboardSummary {
            today: self.window_summary(windows.today).await?,
            last_7_days: self.window_summary(windows.last_7_days).await?,
            month_to_date: self.window_summary(windows.month_to_date).await?,
        })
    }

    /// Aggregates for one window starting at `start`.
    async fn window_summary(&self, start: DateTime<Utc>) -> DbResult<WindowSummary> {
        let (sale_count, total_sales_cents): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) \
             FROM sales WHERE created_at >= ?1",
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        // Per-line profit (price - cost_at_sale) x quantity, summed in the
        // raw cents-milliunit scale.
        let profit_numerator: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM((l.unit_price_cents - l.unit_cost_cents) * l.quantity_milli), 0) \
             FROM sale_lines l \
             JOIN sales s ON s.id = l.sale_id \
             WHERE s.created_at >= ?1",
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(WindowSummary {
            window_start: start,
            total_sales_cents,
            profit_cents: analytics::profit_cents(profit_numerator as i128),
            sale_count,
            average_ticket_cents: analytics::average_ticket_cents(total_sales_cents, sale_count),
        })
    }

    /// Top sellers of the trailing 7 days by summed quantity, descending.
    ///
    /// Ties break on product id ascending, so the ranking is deterministic
    /// run to run.
    pub async fn top_products(&self, now: DateTime<Utc>) -> DbResult<Vec<TopProduct>> {
        let start = now - Duration::days(7);

        let rows = sqlx::query_as::<_, TopProduct>(
            "SELECT l.product_id AS product_id, p.description AS description, \
                    SUM(l.quantity_milli) AS quantity_sold_milli \
             FROM sale_lines l \
             JOIN sales s ON s.id = l.sale_id \
             JOIN products p ON p.id = l.product_id \
             WHERE s.created_at >= ?1 \
             GROUP BY l.product_id, p.description \
             ORDER BY quantity_sold_milli DESC, l.product_id ASC \
             LIMIT ?2",
        )
        .bind(start)
        .bind(i64::from(TOP_PRODUCTS_LIMIT))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Current book value and sale potential over active products.
    pub async fn inventory_summary(&self) -> DbResult<InventorySummary> {
        let (product_count, total_quantity_milli, cost_numerator, price_numerator): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(quantity_milli), 0), \
                    COALESCE(SUM(quantity_milli * COALESCE(cost_cents, 0)), 0), \
                    COALESCE(SUM(quantity_milli * COALESCE(price_cents, 0)), 0) \
             FROM products WHERE is_active = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(InventorySummary {
            product_count,
            total_quantity_milli,
            stock_cost_value_cents: estok_core::money::round_cents_milli(cost_numerator as i128),
            stock_sale_value_cents: estok_core::money::round_cents_milli(price_numerator as i128),
        })
    }

    /// Reorder alerts: active, in-stock products whose trailing-30-day sales
    /// velocity leaves fewer than 7 days of supply. Most urgent first.
    pub async fn reorder_alerts(&self, now: DateTime<Utc>) -> DbResult<Vec<ReorderAlert>> {
        let start = analytics::velocity_window_start(now);

        let inputs = sqlx::query_as::<_, VelocityInput>(
            "SELECT p.id AS product_id, p.description AS description, \
                    p.quantity_milli AS quantity_milli, \
                    COALESCE((SELECT SUM(l.quantity_milli) \
                              FROM sale_lines l \
                              JOIN sales s ON s.id = l.sale_id \
                              WHERE l.product_id = p.id AND s.created_at >= ?1), 0) \
                        AS sold_30d_milli \
             FROM products p \
             WHERE p.is_active = 1 AND p.quantity_milli > 0",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(analytics::reorder_alerts(inputs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use estok_core::{NewProduct, NewSaleLine, Product, StockPolicy};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(
        db: &Database,
        description: &str,
        quantity_milli: i64,
        cost_cents: Option<i64>,
        price_cents: Option<i64>,
    ) -> Product {
        db.products()
            .create(NewProduct {
                description: description.to_string(),
                ean13: None,
                aux_code: None,
                initial_quantity_milli: quantity_milli,
                cost_cents,
                price_cents,
            })
            .await
            .unwrap()
    }

    async fn sell(db: &Database, product_id: &str, quantity_milli: i64, unit_price_cents: i64) -> String {
        db.sales()
            .create_sale(
                vec![NewSaleLine {
                    product_id: product_id.to_string(),
                    quantity_milli,
                    unit_price_cents,
                }],
                None,
                StockPolicy::default(),
            )
            .await
            .unwrap()
            .sale_id
    }

    /// Backdates a sale so it falls outside the analytics windows.
    async fn backdate_sale(db: &Database, sale_id: &str, days: i64) {
        let stamp = Utc::now() - Duration::days(days);
        sqlx::query("UPDATE sales SET created_at = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(stamp)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_store_resolves_to_zeros() {
        let db = test_db().await;
        let summary = db.analytics().dashboard_summary(Utc::now()).await.unwrap();

        assert_eq!(summary.today.sale_count, 0);
        assert_eq!(summary.today.total_sales_cents, 0);
        assert_eq!(summary.today.profit_cents, 0);
        // Zero sales means average ticket 0, never a division error
        assert_eq!(summary.today.average_ticket_cents, 0);

        assert!(db.analytics().top_products(Utc::now()).await.unwrap().is_empty());
        assert!(db.analytics().reorder_alerts(Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_window_summary_sums_and_average() {
        let db = test_db().await;
        let coffee = seed_product(&db, "Coffee", 100_000, Some(300), Some(500)).await;

        // Two sales today: 2 x 5.00 = 10.00 and 1 x 5.00 = 5.00
        sell(&db, &coffee.id, 2_000, 500).await;
        sell(&db, &coffee.id, 1_000, 500).await;

        // One sale far outside every window
        let old = sell(&db, &coffee.id, 10_000, 500).await;
        backdate_sale(&db, &old, 40).await;

        let summary = db.analytics().dashboard_summary(Utc::now()).await.unwrap();

        assert_eq!(summary.today.sale_count, 2);
        assert_eq!(summary.today.total_sales_cents, 1_500);
        assert_eq!(summary.today.average_ticket_cents, 750);
        // Profit: (5.00 - 3.00) x 3 units
        assert_eq!(summary.today.profit_cents, 600);

        assert_eq!(summary.last_7_days.sale_count, 2);
        assert_eq!(summary.month_to_date.sale_count, 2);
    }

    #[tokio::test]
    async fn test_profit_uses_cost_frozen_at_sale_time() {
        let db = test_db().await;
        let coffee = seed_product(&db, "Coffee", 100_000, Some(300), Some(500)).await;
        sell(&db, &coffee.id, 1_000, 500).await;

        // Catalog cost rises after the sale; window profit must not move
        db.products()
            .update(
                &coffee.id,
                estok_core::ProductPatch {
                    cost_cents: Some(Some(450)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let summary = db.analytics().dashboard_summary(Utc::now()).await.unwrap();
        assert_eq!(summary.today.profit_cents, 200);
    }

    #[tokio::test]
    async fn test_top_products_ordering_and_tie_break() {
        let db = test_db().await;
        let coffee = seed_product(&db, "Coffee", 100_000, None, Some(500)).await;
        let sugar = seed_product(&db, "Sugar", 100_000, None, Some(200)).await;
        let flour = seed_product(&db, "Flour", 100_000, None, Some(300)).await;

        sell(&db, &coffee.id, 5_000, 500).await;
        sell(&db, &sugar.id, 9_000, 200).await;
        // Flour ties with coffee on quantity
        sell(&db, &flour.id, 5_000, 300).await;

        let top = db.analytics().top_products(Utc::now()).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].product_id, sugar.id);
        assert_eq!(top[0].quantity_sold_milli, 9_000);

        // Tie between coffee and flour breaks on product id ascending
        let (first_tied, second_tied) = (&top[1], &top[2]);
        assert_eq!(first_tied.quantity_sold_milli, 5_000);
        assert_eq!(second_tied.quantity_sold_milli, 5_000);
        assert!(first_tied.product_id < second_tied.product_id);
    }

    #[tokio::test]
    async fn test_top_products_caps_at_five() {
        let db = test_db().await;
        for i in 0..7i64 {
            let product =
                seed_product(&db, &format!("Item {i}"), 100_000, None, Some(100)).await;
            sell(&db, &product.id, 1_000 + i * 100, 100).await;
        }

        let top = db.analytics().top_products(Utc::now()).await.unwrap();
        assert_eq!(top.len(), 5);
    }

    #[tokio::test]
    async fn test_inventory_summary_values() {
        let db = test_db().await;
        // 2.000 units at cost 3.00 / price 5.00
        seed_product(&db, "Coffee", 2_000, Some(300), Some(500)).await;
        // 1.500 units, no cost on record, price 2.00
        seed_product(&db, "Sugar", 1_500, None, Some(200)).await;
        // Inactive products are excluded
        let gone = seed_product(&db, "Gone", 9_000, Some(100), Some(100)).await;
        db.products().deactivate(&gone.id).await.unwrap();

        let summary = db.analytics().inventory_summary().await.unwrap();
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.total_quantity_milli, 3_500);
        assert_eq!(summary.stock_cost_value_cents, 600);
        assert_eq!(summary.stock_sale_value_cents, 1_300);
    }

    #[tokio::test]
    async fn test_reorder_alerts_spec_examples() {
        let db = test_db().await;

        // Ends with quantity 10, sold 60 in window: 5 days of supply
        let fast = seed_product(&db, "Fast", 70_000, None, Some(100)).await;
        sell(&db, &fast.id, 60_000, 100).await;

        // Ends with quantity 100, sold 30: 100 days of supply
        let slow = seed_product(&db, "Slow", 130_000, None, Some(100)).await;
        sell(&db, &slow.id, 30_000, 100).await;

        let alerts = db.analytics().reorder_alerts(Utc::now()).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].product_id, fast.id);
        assert_eq!(alerts[0].daily_average_milli, 2_000);
        assert!((alerts[0].days_supply - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reorder_alerts_ignore_sales_outside_window() {
        let db = test_db().await;
        let product = seed_product(&db, "Seasonal", 70_000, None, Some(100)).await;
        let sale_id = sell(&db, &product.id, 60_000, 100).await;
        backdate_sale(&db, &sale_id, 40).await;

        // The only sale is 40 days old: no velocity signal, no alert
        let alerts = db.analytics().reorder_alerts(Utc::now()).await.unwrap();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_reorder_alerts_skip_out_of_stock_products() {
        let db = test_db().await;
        let product = seed_product(&db, "Emptied", 10_000, None, Some(100)).await;
        // Oversell to zero the stock out; quantity <= 0 means no coverage
        // signal to report
        sell(&db, &product.id, 10_000, 100).await;

        let alerts = db.analytics().reorder_alerts(Utc::now()).await.unwrap();
        assert!(alerts.is_empty());
    }
}
