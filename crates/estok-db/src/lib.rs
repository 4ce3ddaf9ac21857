//! # estok-db: Database Layer for Estok
//!
//! This crate provides persistence for the Estok inventory and point-of-sale
//! backend. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! HTTP handler (apps/server)
//!      |
//!      |  db.sales().create_sale(lines, None, policy)
//!      v
//! estok-db (THIS CRATE)
//!   Database (pool.rs)  Repositories          Migrations (embedded)
//!   SqlitePool          products / movements  001_initial_schema.sql
//!   WAL, FKs on         sales / analytics
//!      |
//!      v
//! SQLite database file
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Transaction Ownership
//!
//! Every multi-step mutation is a single transaction owned by this crate:
//! the ledger's read-compute-write-append and the checkout's
//! header/lines/stock/movements sequence either commit whole or leave no
//! trace. Pure arithmetic is delegated to estok-core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use estok_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/estok.db")).await?;
//! let products = db.products().search("widget", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::analytics::{
    AnalyticsRepository, DashboardSummary, InventorySummary, TopProduct, WindowSummary,
};
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleReceipt, SaleRecord, SaleRepository};
