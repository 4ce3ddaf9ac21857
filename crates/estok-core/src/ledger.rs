//! # Ledger Arithmetic
//!
//! Pure movement math: given a movement kind, the quantity on hand before,
//! and the requested quantity, compute the before/delta/after triple that
//! gets frozen onto the movement record.
//!
//! ## Kind Semantics
//! ```text
//! ENTRY   delta = +|q|          new = before + delta
//! EXIT    delta = -|q|          new = before + delta (may go negative)
//! ADJUST  q is the TARGET       delta = q - before, new = q
//! SALE    delta = -|q|          new = before + delta (processor-only)
//! ```
//!
//! The invariant `after == before + delta` holds by construction for every
//! kind; the persistence layer stores the triple exactly as computed here so
//! the movement history replays to the current quantity.

use crate::quantity::Quantity;
use crate::types::{MovementKind, StockPolicy};

/// The effect of one movement on a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementEffect {
    pub before: Quantity,
    pub delta: Quantity,
    pub after: Quantity,
}

impl MovementEffect {
    /// Computes the effect of a movement.
    ///
    /// For ENTRY/EXIT/SALE the sign of `quantity` is ignored: the kind alone
    /// decides the direction. For ADJUST, `quantity` is the absolute target
    /// (which may itself be negative when recording a real deficit).
    pub fn compute(kind: MovementKind, before: Quantity, quantity: Quantity) -> Self {
        match kind {
            MovementKind::Entry => {
                let delta = quantity.abs();
                MovementEffect {
                    before,
                    delta,
                    after: before + delta,
                }
            }
            MovementKind::Exit | MovementKind::Sale => {
                let delta = -quantity.abs();
                MovementEffect {
                    before,
                    delta,
                    after: before + delta,
                }
            }
            MovementKind::Adjust => MovementEffect {
                before,
                delta: quantity - before,
                after: quantity,
            },
        }
    }

    /// Whether the stock policy permits this effect.
    ///
    /// Only EXIT and SALE are floored: ADJUST is the sanctioned correction
    /// path and must be able to record reality, including deficits, and
    /// ENTRY can never reduce stock.
    pub fn permitted_by(&self, kind: MovementKind, policy: StockPolicy) -> bool {
        if policy.allow_negative_stock {
            return true;
        }
        match kind {
            MovementKind::Exit | MovementKind::Sale => !self.after.is_negative(),
            MovementKind::Entry | MovementKind::Adjust => true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
