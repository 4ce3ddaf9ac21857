//! # Sale Repository
//!
//! Checkout processing: the one operation that mutates three entities
//! together (product quantities, the movement ledger, and the sale with its
//! lines), all-or-nothing.
//!
//! ## Checkout Transaction
//! ```text
//! validate every line            (fail fast, store untouched)
//! BEGIN
//!   INSERT sale (total = 0)      (provisional header, id known)
//!   for each line, in order:
//!     SELECT product             (unknown id aborts everything)
//!     capture unit cost          (frozen onto the line)
//!     INSERT sale_line
//!     UPDATE products SET quantity = quantity - qty RETURNING quantity
//!     INSERT movement (kind = SALE, sale_id, note "Sale #<id>")
//!   UPDATE sale SET total = computed sum
//! COMMIT
//! ```
//!
//! The per-line stock decrement is a single read-modify-write statement, so
//! the before/after pair on the SALE movement can never race another writer.
//! Any failure rolls the whole transaction back; partial sales are never
//! observable.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::movement::insert_movement;
use estok_core::validation::validate_sale_lines;
use estok_core::{
    CoreError, Money, Movement, MovementKind, NewSaleLine, Quantity, Sale, SaleLine, StockPolicy,
};

/// Result of a committed checkout.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub line_count: usize,
    pub total_cents: i64,
}

/// A sale together with its ordered lines.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// Repository for sale processing.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Processes a checkout atomically.
    ///
    /// The header total is always the server-computed sum of line totals;
    /// `declared_total_cents` (when a client sends one) is only compared
    /// against it to flag anomalies, never persisted.
    ///
    /// ## Errors
    /// * `DbError::Validation` - no lines, non-positive quantity, negative price
    /// * `DbError::NotFound` - a line references an unknown product (the
    ///   whole sale is rolled back)
    /// * `DbError::Core(InsufficientStock)` - strict stock policy rejected a
    ///   line (the whole sale is rolled back)
    pub async fn create_sale(
        &self,
        lines: Vec<NewSaleLine>,
        declared_total_cents: Option<i64>,
        policy: StockPolicy,
    ) -> DbResult<SaleReceipt> {
        validate_sale_lines(&lines)?;

        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(sale_id = %sale_id, lines = lines.len(), "Opening checkout transaction");

        let mut tx = self.pool.begin().await?;

        // Provisional header so the lines and movements have an id to
        // reference; the total is fixed exactly once before commit.
        sqlx::query("INSERT INTO sales (id, total_cents, created_at) VALUES (?1, 0, ?2)")
            .bind(&sale_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let mut running_total = Money::zero();

        for line in &lines {
            let product: Option<(i64, Option<i64>)> =
                sqlx::query_as("SELECT quantity_milli, cost_cents FROM products WHERE id = ?1")
                    .bind(&line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let (_, cost_cents) = product
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            let quantity = Quantity::from_milli(line.quantity_milli);
            let unit_cost = Money::from_cents(cost_cents.unwrap_or(0));
            let unit_price = Money::from_cents(line.unit_price_cents);
            let line_total = unit_price.times_quantity(quantity);
            running_total += line_total;

            sqlx::query(
                "INSERT INTO sale_lines (id, sale_id, product_id, quantity_milli, \
                 unit_cost_cents, unit_price_cents, line_total_cents) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale_id)
            .bind(&line.product_id)
            .bind(line.quantity_milli)
            .bind(unit_cost.cents())
            .bind(unit_price.cents())
            .bind(line_total.cents())
            .execute(&mut *tx)
            .await?;

            // Atomic read-modify-write: the returned value is the post-sale
            // quantity, so the movement's before/after pair comes from the
            // same statement that wrote it.
            let after_milli: i64 = sqlx::query_scalar(
                "UPDATE products SET quantity_milli = quantity_milli - ?2, updated_at = ?3 \
                 WHERE id = ?1 RETURNING quantity_milli",
            )
            .bind(&line.product_id)
            .bind(line.quantity_milli)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            let before_milli = after_milli + line.quantity_milli;

            if !policy.allow_negative_stock && after_milli < 0 {
                // Dropping the transaction rolls back the header and every
                // line processed so far.
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available: Quantity::from_milli(before_milli),
                    requested: quantity,
                }
                .into());
            }

            let movement = Movement {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id.clone(),
                kind: MovementKind::Sale,
                quantity_before_milli: before_milli,
                quantity_delta_milli: -line.quantity_milli,
                quantity_after_milli: after_milli,
                sale_id: Some(sale_id.clone()),
                note: Some(format!("Sale #{sale_id}")),
                created_at: now,
            };
            insert_movement(&mut *tx, &movement).await?;
        }

        sqlx::query("UPDATE sales SET total_cents = ?2 WHERE id = ?1")
            .bind(&sale_id)
            .bind(running_total.cents())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if let Some(declared) = declared_total_cents {
            if declared != running_total.cents() {
                warn!(
                    sale_id = %sale_id,
                    declared_cents = declared,
                    computed_cents = running_total.cents(),
                    "Client-declared total differs from server-computed total"
                );
            }
        }

        info!(
            sale_id = %sale_id,
            total = %running_total,
            lines = lines.len(),
            "Sale committed"
        );

        Ok(SaleReceipt {
            sale_id,
            line_count: lines.len(),
            total_cents: running_total.cents(),
        })
    }

    /// Gets a sale with its lines in insertion order.
    pub async fn get(&self, sale_id: &str) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, total_cents, created_at FROM sales WHERE id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLine>(
            "SELECT id, sale_id, product_id, quantity_milli, unit_cost_cents, \
             unit_price_cents, line_total_cents \
             FROM sale_lines WHERE sale_id = ?1 ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleRecord { sale, lines }))
    }
}

// =============================================================================
// Tests
// =============================================================================
