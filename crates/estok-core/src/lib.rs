//! # estok-core: Pure Business Logic for Estok
//!
//! Estok is a small-business inventory and point-of-sale backend. This crate
//! is its heart: every rule that keeps a product's on-hand quantity, its
//! movement history, and its recorded sales mutually consistent lives here as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! HTTP clients
//!      |
//! apps/server          axum routes, DTOs, config, lifecycle
//!      |
//! crates/estok-db      SQLite repositories, transactions, migrations
//!      |
//! crates/estok-core    THIS CRATE
//!      |
//!   types  money  quantity  ledger  search  analytics  validation
//!
//!   NO I/O - NO DATABASE - NO NETWORK - PURE FUNCTIONS
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, Sale, SaleLine, policy)
//! - [`money`] - Integer-cents money (2 fractional digits, no floats)
//! - [`quantity`] - Integer-milliunit stock quantities (3 fractional digits)
//! - [`ledger`] - Movement arithmetic (ENTRY/EXIT/ADJUST/SALE effects)
//! - [`search`] - Tiered relevance ranking for point-of-sale lookup
//! - [`analytics`] - Dashboard windows, profit math, reorder alerts
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, same input = same output
//! 2. **No I/O**: database, network, file system access is forbidden here
//! 3. **Integer Arithmetic**: cents and milliunits, never floating point
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod ledger;
pub mod money;
pub mod quantity;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use ledger::MovementEffect;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default cap for search results (point-of-sale screens ask for a short,
/// ranked list; management views use the uncapped listing instead).
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Exact length of the primary lookup code.
pub const EAN13_LEN: usize = 13;

/// Maximum length of the auxiliary lookup code.
pub const MAX_AUX_CODE_LEN: usize = 6;

/// Maximum length of a search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
