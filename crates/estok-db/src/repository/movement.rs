//! # Movement Repository (the Ledger)
//!
//! Append-only stock movements and the one place a product's quantity is
//! ever written.
//!
//! ## Atomicity Contract
//! ```text
//! BEGIN
//!   read quantity_before                 (same transaction)
//!   compute delta/after (estok-core)     (pure)
//!   UPDATE products ... WHERE quantity_milli = before   <- compare-and-swap
//!   INSERT movement (before, delta, after)
//! COMMIT
//! ```
//!
//! The compare-and-swap guard means two concurrent movements on the same
//! product can never interleave their before/after pairs: the loser's UPDATE
//! matches zero rows, the attempt rolls back, and a bounded retry re-reads.
//! Exhausting the retries surfaces a conflict error instead of hanging.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use estok_core::{
    CoreError, Movement, MovementEffect, MovementKind, Product, Quantity, StockPolicy,
    ValidationError,
};

/// Attempts before a racing writer turns into a conflict error.
const CAS_MAX_ATTEMPTS: u32 = 3;

/// All movement columns, in struct order, for `query_as::<_, Movement>`.
const MOVEMENT_COLUMNS: &str = "id, product_id, kind, quantity_before_milli, \
     quantity_delta_milli, quantity_after_milli, sale_id, note, created_at";

/// Repository for the stock movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Applies one stock movement atomically.
    ///
    /// Recomputes and persists the product's quantity and appends the
    /// immutable movement record in a single transaction. The SALE kind is
    /// rejected here: sale movements exist only inside a checkout
    /// transaction (see the sale repository).
    ///
    /// ## Errors
    /// * `DbError::Validation` - kind is SALE (not an external kind)
    /// * `DbError::NotFound` - unknown product
    /// * `DbError::Core(InsufficientStock)` - the stock policy forbids the
    ///   resulting negative quantity
    /// * `DbError::Conflict` - concurrent writers exhausted the retries
    pub async fn apply_movement(
        &self,
        product_id: &str,
        kind: MovementKind,
        quantity: Quantity,
        note: Option<String>,
        policy: StockPolicy,
    ) -> DbResult<(Product, Movement)> {
        if kind == MovementKind::Sale {
            return Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: MovementKind::EXTERNAL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }
            .into());
        }

        for attempt in 1..=CAS_MAX_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            let mut product = sqlx::query_as::<_, Product>(
                "SELECT id, description, ean13, aux_code, quantity_milli, cost_cents, \
                 price_cents, is_active, created_at, updated_at FROM products WHERE id = ?1",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

            let effect = MovementEffect::compute(kind, product.quantity(), quantity);
            if !effect.permitted_by(kind, policy) {
                return Err(CoreError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available: effect.before,
                    requested: quantity.abs(),
                }
                .into());
            }

            let now = Utc::now();

            let updated = sqlx::query(
                "UPDATE products SET quantity_milli = ?3, updated_at = ?4 \
                 WHERE id = ?1 AND quantity_milli = ?2",
            )
            .bind(product_id)
            .bind(effect.before.milli())
            .bind(effect.after.milli())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                // Another movement landed between our read and our write;
                // drop this transaction and re-read.
                tx.rollback().await?;
                debug!(product_id = %product_id, attempt, "Movement CAS miss, retrying");
                continue;
            }

            let movement = Movement {
                id: Uuid::new_v4().to_string(),
                product_id: product_id.to_string(),
                kind,
                quantity_before_milli: effect.before.milli(),
                quantity_delta_milli: effect.delta.milli(),
                quantity_after_milli: effect.after.milli(),
                sale_id: None,
                note,
                created_at: now,
            };
            insert_movement(&mut *tx, &movement).await?;

            tx.commit().await?;

            info!(
                product_id = %product_id,
                kind = %kind,
                delta = %effect.delta,
                after = %effect.after,
                "Movement applied"
            );

            product.quantity_milli = effect.after.milli();
            product.updated_at = now;
            return Ok((product, movement));
        }

        Err(DbError::conflict("Product", product_id))
    }

    /// Returns the kardex: one product's movement history, newest first.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - unknown product
    pub async fn kardex(&self, product_id: &str) -> DbResult<Vec<Movement>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements \
             WHERE product_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Returns the movements recorded for one sale, in line order.
    pub async fn find_by_sale(&self, sale_id: &str) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Inserts a movement row on the given executor.
///
/// Shared with the sale repository, which appends SALE movements inside its
/// own checkout transaction.
pub(crate) async fn insert_movement<'e, E>(executor: E, movement: &Movement) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO movements (id, product_id, kind, quantity_before_milli, \
         quantity_delta_milli, quantity_after_milli, sale_id, note, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.kind)
    .bind(movement.quantity_before_milli)
    .bind(movement.quantity_delta_milli)
    .bind(movement.quantity_after_milli)
    .bind(&movement.sale_id)
    .bind(&movement.note)
    .bind(movement.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use estok_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, quantity_milli: i64) -> Product {
        db.products()
            .create(NewProduct {
                description: "Ledgered".to_string(),
                ean13: None,
                aux_code: None,
                initial_quantity_milli: quantity_milli,
                cost_cents: Some(100),
                price_cents: Some(250),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_entry_increases_stock_and_records_triple() {
        let db = test_db().await;
        let product = seed_product(&db, 2_000).await;

        let (updated, movement) = db
            .movements()
            .apply_movement(
                &product.id,
                MovementKind::Entry,
                Quantity::from_milli(3_500),
                Some("restock".to_string()),
                StockPolicy::default(),
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity_milli, 5_500);
        assert_eq!(movement.quantity_before_milli, 2_000);
        assert_eq!(movement.quantity_delta_milli, 3_500);
        assert_eq!(movement.quantity_after_milli, 5_500);
        assert_eq!(
            movement.quantity_after_milli,
            movement.quantity_before_milli + movement.quantity_delta_milli
        );
        assert_eq!(movement.sale_id, None);
        assert_eq!(movement.note.as_deref(), Some("restock"));
    }

    #[tokio::test]
    async fn test_exit_may_go_negative_under_default_policy() {
        let db = test_db().await;
        let product = seed_product(&db, 1_000).await;

        let (updated, movement) = db
            .movements()
            .apply_movement(
                &product.id,
                MovementKind::Exit,
                Quantity::from_milli(4_000),
                None,
                StockPolicy::default(),
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity_milli, -3_000);
        assert_eq!(movement.quantity_delta_milli, -4_000);
    }

    #[tokio::test]
    async fn test_exit_blocked_by_strict_policy() {
        let db = test_db().await;
        let product = seed_product(&db, 1_000).await;

        let err = db
            .movements()
            .apply_movement(
                &product.id,
                MovementKind::Exit,
                Quantity::from_milli(4_000),
                None,
                StockPolicy {
                    allow_negative_stock: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock { .. })
        ));

        // Nothing persisted: quantity unchanged, kardex empty
        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity_milli, 1_000);
        assert!(db.movements().kardex(&product.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_sets_target_exactly() {
        let db = test_db().await;
        let product = seed_product(&db, 7_250).await;

        let (updated, movement) = db
            .movements()
            .apply_movement(
                &product.id,
                MovementKind::Adjust,
                Quantity::from_milli(10_000),
                Some("stocktake".to_string()),
                StockPolicy::default(),
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity_milli, 10_000);
        assert_eq!(movement.quantity_delta_milli, 2_750);
        assert_eq!(movement.quantity_after_milli, 10_000);
    }

    #[tokio::test]
    async fn test_sale_kind_rejected_for_external_callers() {
        let db = test_db().await;
        let product = seed_product(&db, 1_000).await;

        let err = db
            .movements()
            .apply_movement(
                &product.id,
                MovementKind::Sale,
                Quantity::from_milli(500),
                None,
                StockPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;

        let err = db
            .movements()
            .apply_movement(
                "missing",
                MovementKind::Entry,
                Quantity::from_milli(500),
                None,
                StockPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_kardex_replays_to_current_quantity() {
        let db = test_db().await;
        let product = seed_product(&db, 0).await;
        let movements = db.movements();
        let policy = StockPolicy::default();

        movements
            .apply_movement(&product.id, MovementKind::Entry, Quantity::from_milli(5_000), None, policy)
            .await
            .unwrap();
        movements
            .apply_movement(&product.id, MovementKind::Exit, Quantity::from_milli(1_250), None, policy)
            .await
            .unwrap();
        movements
            .apply_movement(&product.id, MovementKind::Adjust, Quantity::from_milli(3_000), None, policy)
            .await
            .unwrap();

        let history = movements.kardex(&product.id).await.unwrap();
        assert_eq!(history.len(), 3);

        // Newest first; replaying oldest-to-newest lands on current stock
        let replayed: i64 = history.iter().rev().map(|m| m.quantity_delta_milli).sum();
        let current = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(replayed, current.quantity_milli);
        assert_eq!(current.quantity_milli, 3_000);

        for movement in &history {
            assert_eq!(
                movement.quantity_after_milli,
                movement.quantity_before_milli + movement.quantity_delta_milli
            );
        }
    }

    #[tokio::test]
    async fn test_kardex_unknown_product_is_not_found() {
        let db = test_db().await;
        let err = db.movements().kardex("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
