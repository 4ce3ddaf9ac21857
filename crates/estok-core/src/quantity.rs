//! # Quantity Module
//!
//! Fixed-point stock quantities with 3 fractional digits.
//!
//! Stock is counted in milliunits: 2500 milliunits is 2.500 units. The extra
//! decimal (versus money's two) exists because products are sold by weight
//! and length as well as by piece. The same integer rules as [`crate::money`]
//! apply: all arithmetic is exact, signed, and never touches floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed stock quantity in milliunits (3 fractional digits).
///
/// Negative quantities are representable on purpose: the ledger allows stock
/// to go below zero unless the negative-stock policy forbids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from milliunits.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Returns the value in milliunits.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }
}

/// Decimal rendering with all three fractional digits ("2.500", "-0.250").
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03}", sign, (self.0 / 1000).abs(), (self.0 % 1000).abs())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        assert_eq!(Quantity::from_units(3).milli(), 3_000);
        assert_eq!(Quantity::from_units(-2).milli(), -2_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Quantity::from_milli(2_500)), "2.500");
        assert_eq!(format!("{}", Quantity::from_milli(-250)), "-0.250");
        assert_eq!(format!("{}", Quantity::zero()), "0.000");
    }

    #[test]
    fn test_arithmetic_is_exact_at_three_decimals() {
        let a = Quantity::from_milli(1);
        let mut sum = Quantity::zero();
        for _ in 0..1000 {
            sum += a;
        }
        // 1000 additions of 0.001 land exactly on 1.000
        assert_eq!(sum, Quantity::from_units(1));
    }

    #[test]
    fn test_neg_and_abs() {
        let q = Quantity::from_milli(750);
        assert_eq!((-q).milli(), -750);
        assert_eq!((-q).abs(), q);
        assert!((-q).is_negative());
        assert!(q.is_positive());
    }
}
