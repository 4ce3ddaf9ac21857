//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - CRUD with partial-update semantics
//! - Uncapped active listing for management views
//! - Ranked point-of-sale search (candidates via SQL, tiers via estok-core)
//!
//! Quantity is conspicuously absent from the update path: all quantity
//! changes go through the ledger so the movement history stays the single
//! source of truth.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use estok_core::validation::{validate_new_product, validate_product_patch, validate_search_query};
use estok_core::{search, NewProduct, Product, ProductPatch};

/// All product columns, in struct order, for `query_as::<_, Product>`.
const PRODUCT_COLUMNS: &str = "id, description, ean13, aux_code, quantity_milli, \
     cost_cents, price_cents, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.create(new_product).await?;
/// let results = repo.search("widget", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    ///
    /// The starting quantity defaults to zero and is the only quantity write
    /// that bypasses the ledger (there is no history yet to audit).
    ///
    /// ## Errors
    /// * `DbError::Validation` - empty description, malformed codes
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        validate_new_product(&input)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            ean13: input.ean13,
            aux_code: input.aux_code.map(|code| code.trim().to_string()),
            quantity_milli: input.initial_quantity_milli,
            cost_cents: input.cost_cents,
            price_cents: input.price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, description = %product.description, "Inserting product");

        sqlx::query(
            "INSERT INTO products (id, description, ean13, aux_code, quantity_milli, \
             cost_cents, price_cents, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&product.id)
        .bind(&product.description)
        .bind(&product.ean13)
        .bind(&product.aux_code)
        .bind(product.quantity_milli)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update.
    ///
    /// Only fields present in the patch change; `Some(None)` clears nullable
    /// fields. The patch carries no quantity on purpose.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - unknown product id
    /// * `DbError::Validation` - a present field fails validation
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        validate_product_patch(&patch)?;

        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if let Some(description) = patch.description {
            product.description = description.trim().to_string();
        }
        if let Some(ean13) = patch.ean13 {
            product.ean13 = ean13;
        }
        if let Some(aux_code) = patch.aux_code {
            product.aux_code = aux_code.map(|code| code.trim().to_string());
        }
        if let Some(cost_cents) = patch.cost_cents {
            product.cost_cents = cost_cents;
        }
        if let Some(price_cents) = patch.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(is_active) = patch.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            "UPDATE products SET description = ?2, ean13 = ?3, aux_code = ?4, \
             cost_cents = ?5, price_cents = ?6, is_active = ?7, updated_at = ?8 \
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.description)
        .bind(&product.ean13)
        .bind(&product.aux_code)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists ALL active products ordered by description, with no cap.
    ///
    /// For management views (registration/stock screens); the point-of-sale
    /// path uses [`Self::search`], which caps.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY description"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Ranked search over active products for search-as-you-type entry.
    ///
    /// ## How It Works
    /// 1. Empty term: active products ordered by description, capped
    /// 2. Otherwise SQL collects candidates (exact ean13 or aux code match,
    ///    or case-insensitive description substring)
    /// 3. estok-core assigns relevance tiers and truncates AFTER ranking
    pub async fn search(&self, term: &str, limit: usize) -> DbResult<Vec<Product>> {
        let term = validate_search_query(term)?;

        debug!(term = %term, limit = %limit, "Searching products");

        if term.is_empty() {
            let products = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 \
                 ORDER BY description LIMIT ?1"
            ))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
            return Ok(products);
        }

        // Candidate set only; relevance is decided in estok-core so the
        // tier rule stays in one tested place.
        let candidates = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND (ean13 = ?1 OR aux_code = ?1 \
                OR description LIKE '%' || ?1 || '%')"
        ))
        .bind(&term)
        .fetch_all(&self.pool)
        .await?;

        let ranked = search::rank_and_truncate(candidates, &term, limit);

        debug!(count = ranked.len(), "Search returned products");
        Ok(ranked)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Movements and sale lines keep referencing the product; history must
    /// survive the product leaving the catalog.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

}

// =============================================================================
// Tests
// =============================================================================
