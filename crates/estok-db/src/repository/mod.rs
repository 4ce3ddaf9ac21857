//! # Repository Module
//!
//! Database repository implementations for Estok.
//!
//! ## Repository Pattern
//! The repository pattern keeps all SQL behind a clean API:
//!
//! ```text
//! HTTP handler
//!      |   db.products().search("widget", 20)
//!      v
//! ProductRepository / MovementRepository / SaleRepository / AnalyticsRepository
//!      |   SQL
//!      v
//! SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, listing, ranked search
//! - [`movement::MovementRepository`] - The ledger: atomic stock movements
//! - [`sale::SaleRepository`] - Checkout: atomic multi-line sales
//! - [`analytics::AnalyticsRepository`] - Read-only dashboard aggregates

pub mod analytics;
pub mod movement;
pub mod product;
pub mod sale;
