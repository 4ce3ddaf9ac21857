//! # Domain Types
//!
//! Core domain types for the Estok inventory and point-of-sale backend.
//!
//! ## Entity Relationships
//! ```text
//! Product 1 ──── * Movement   (ledger: every quantity change, append-only)
//! Product 1 ──── * SaleLine   (weak reference by id, cost frozen at sale time)
//! Sale    1 ──── * SaleLine   (ordered lines of one checkout)
//! Sale    1 ──── * Movement   (the SALE-kind movements it caused)
//! ```
//!
//! All quantities are integer milliunits (3 fractional digits) and all money
//! is integer cents (2 fractional digits); the structs carry the raw integers
//! the way the database stores them, with typed accessors on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Product
// =============================================================================

/// A catalog product and its current on-hand quantity.
///
/// `quantity_milli` is derived state: it is the union of all movement effects
/// applied in order and is never written directly except through the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4), immutable once assigned.
    pub id: String,

    /// Display description. Never empty.
    pub description: String,

    /// Primary lookup code: exactly 13 ASCII digits when present.
    pub ean13: Option<String>,

    /// Short auxiliary lookup code (at most 6 characters).
    pub aux_code: Option<String>,

    /// On-hand quantity in milliunits. Signed: the ledger may drive it
    /// negative when the stock policy allows.
    pub quantity_milli: i64,

    /// Cost price in cents.
    pub cost_cents: Option<i64>,

    /// Sale price in cents.
    pub price_cents: Option<i64>,

    /// Soft-delete flag. Products are never physically deleted because
    /// movements and sale lines keep referencing them.
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the on-hand quantity as a typed value.
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Returns the cost price, if any.
    #[inline]
    pub fn cost(&self) -> Option<Money> {
        self.cost_cents.map(Money::from_cents)
    }

    /// Returns the cost price, defaulting to zero. This is the value frozen
    /// onto a sale line when the product has no cost on record.
    #[inline]
    pub fn cost_or_zero(&self) -> Money {
        Money::from_cents(self.cost_cents.unwrap_or(0))
    }

    /// Returns the sale price, if any.
    #[inline]
    pub fn price(&self) -> Option<Money> {
        self.price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a stock movement.
///
/// Stored and serialized as uppercase text ("ENTRY", "EXIT", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Stock received: delta is +|quantity|.
    Entry,
    /// Stock leaving outside a sale: delta is -|quantity|.
    Exit,
    /// Correction to an absolute target: the input quantity is the new
    /// on-hand value, delta is target - before.
    Adjust,
    /// Stock sold. Internal-only: created solely by the sale processor,
    /// never accepted from external callers.
    Sale,
}

impl MovementKind {
    /// The kinds external callers may record directly. `Sale` is excluded:
    /// sale movements exist only inside a checkout transaction.
    pub const EXTERNAL: [MovementKind; 3] =
        [MovementKind::Entry, MovementKind::Exit, MovementKind::Adjust];

    /// Uppercase wire/storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "ENTRY",
            MovementKind::Exit => "EXIT",
            MovementKind::Adjust => "ADJUST",
            MovementKind::Sale => "SALE",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementKind {
    type Err = ValidationError;

    /// Parses a kind name, case-insensitively ("entry" == "ENTRY").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRY" => Ok(MovementKind::Entry),
            "EXIT" => Ok(MovementKind::Exit),
            "ADJUST" => Ok(MovementKind::Adjust),
            "SALE" => Ok(MovementKind::Sale),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec![
                    "ENTRY".to_string(),
                    "EXIT".to_string(),
                    "ADJUST".to_string(),
                    "SALE".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// An immutable record of one quantity change applied to one product.
///
/// A correction is a new movement, never an edit. The invariant
/// `quantity_after == quantity_before + quantity_delta` holds for every kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub product_id: String,
    pub kind: MovementKind,
    pub quantity_before_milli: i64,
    pub quantity_delta_milli: i64,
    pub quantity_after_milli: i64,
    /// Set only on SALE movements: the sale this movement belongs to.
    pub sale_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    #[inline]
    pub fn quantity_before(&self) -> Quantity {
        Quantity::from_milli(self.quantity_before_milli)
    }

    #[inline]
    pub fn quantity_delta(&self) -> Quantity {
        Quantity::from_milli(self.quantity_delta_milli)
    }

    #[inline]
    pub fn quantity_after(&self) -> Quantity {
        Quantity::from_milli(self.quantity_after_milli)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed checkout. The total is server-computed from the lines and
/// frozen when the creating transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One line of a sale. Uses the snapshot pattern: the unit cost is copied
/// from the product at sale time so profit accounting keeps the cost basis
/// of the moment of sale even if the catalog's cost later changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold in milliunits. Always positive.
    pub quantity_milli: i64,
    /// Unit cost in cents at the time of sale (frozen).
    pub unit_cost_cents: i64,
    /// Unit price in cents charged on this line.
    pub unit_price_cents: i64,
    /// quantity x unit price, reduced to cents.
    pub line_total_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// Configurable stock policy applied by the ledger and the sale processor.
///
/// The historical behavior is floor-free: EXIT and SALE movements may drive
/// stock negative (back-orders). Disabling `allow_negative_stock` makes such
/// movements fail instead, rolling back the whole operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockPolicy {
    pub allow_negative_stock: bool,
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy {
            allow_negative_stock: true,
        }
    }
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input for creating a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub description: String,
    pub ean13: Option<String>,
    pub aux_code: Option<String>,
    /// Starting quantity; defaults to zero. Creation is the only movement-free
    /// quantity write, after that every change goes through the ledger.
    pub initial_quantity_milli: i64,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
}

/// Partial update of a catalog product.
///
/// Outer `None` means "leave untouched"; for nullable fields, `Some(None)`
/// explicitly clears the value. There is deliberately no quantity field:
/// quantity changes must route through the ledger (ADJUST is the sanctioned
/// set-to-target path).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub description: Option<String>,
    pub ean13: Option<Option<String>>,
    pub aux_code: Option<Option<String>>,
    pub cost_cents: Option<Option<i64>>,
    pub price_cents: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.ean13.is_none()
            && self.aux_code.is_none()
            && self.cost_cents.is_none()
            && self.price_cents.is_none()
            && self.is_active.is_none()
    }
}

/// One requested line of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: String,
    /// Must be strictly positive.
    pub quantity_milli: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
