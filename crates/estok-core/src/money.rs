//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! Floating point cannot represent most decimal fractions exactly
//! (`0.1 + 0.2 != 0.3`), and retail systems that divide or multiply floats
//! silently drift by cents. Every monetary value in Estok is therefore an
//! integer count of the smallest currency unit: 1099 cents is 10.99.
//! Calculations that cross scales (cents times a 3-decimal stock quantity)
//! go through `i128` and are rounded exactly once.
//!
//! ## Usage
//! ```rust
//! use estok_core::money::Money;
//! use estok_core::quantity::Quantity;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let total = price + Money::from_cents(500); // 15.99
//!
//! // Line total for 2.5 units at 10.99:
//! let line = price.times_quantity(Quantity::from_milli(2_500));
//! assert_eq!(line.cents(), 2748); // 27.475 rounds to 27.48
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (2 fractional digits).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are legal (corrections, losses)
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a 3-decimal quantity, yielding cents.
    ///
    /// The raw product is in cents-milliunits (5 fractional digits); it is
    /// reduced back to cents with a single round-half-away-from-zero step.
    ///
    /// ## Example
    /// ```rust
    /// use estok_core::money::Money;
    /// use estok_core::quantity::Quantity;
    ///
    /// // 0.5 units at 1.99 = 0.995 -> 1.00
    /// let total = Money::from_cents(199).times_quantity(Quantity::from_milli(500));
    /// assert_eq!(total.cents(), 100);
    /// ```
    pub fn times_quantity(&self, qty: Quantity) -> Money {
        let raw = self.0 as i128 * qty.milli() as i128;
        Money::from_cents(round_cents_milli(raw))
    }
}

/// Reduces a cents-milliunits product (price × quantity numerator) to cents,
/// rounding half away from zero.
///
/// Used both for single line totals and for sums of many lines: summing the
/// raw numerators first and rounding once keeps multi-line aggregates exact.
pub fn round_cents_milli(raw: i128) -> i64 {
    let half = if raw >= 0 { 500 } else { -500 };
    ((raw + half) / 1000) as i64
}

/// Integer division rounding half away from zero. Zero divisor yields zero
/// (empty analytics windows resolve to zero, never to an error).
pub fn div_round(numerator: i64, divisor: i64) -> i64 {
    if divisor == 0 {
        return 0;
    }
    let n = numerator as i128;
    let d = divisor as i128;
    let half = d.abs() / 2;
    let adjusted = if (n >= 0) == (d > 0) { n + half } else { n - half };
    (adjusted / d) as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly decimal rendering ("10.99", "-5.50"). Locale formatting is
/// the caller's concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_times_whole_quantity_is_exact() {
        // 3 units at 2.99 = 8.97, no rounding involved
        let total = Money::from_cents(299).times_quantity(Quantity::from_milli(3_000));
        assert_eq!(total.cents(), 897);
    }

    #[test]
    fn test_times_fractional_quantity_rounds_once() {
        // 1.5 units at 0.99 = 1.485 -> 1.49 (half away from zero)
        let total = Money::from_cents(99).times_quantity(Quantity::from_milli(1_500));
        assert_eq!(total.cents(), 149);

        // 0.5 units at 1.99 = 0.995 -> 1.00
        let total = Money::from_cents(199).times_quantity(Quantity::from_milli(500));
        assert_eq!(total.cents(), 100);
    }

    #[test]
    fn test_times_negative_price_rounds_away_from_zero() {
        let total = Money::from_cents(-199).times_quantity(Quantity::from_milli(500));
        assert_eq!(total.cents(), -100);
    }

    #[test]
    fn test_round_cents_milli_sums_before_rounding() {
        // Two lines of 0.995 sum to 1.99 exactly when reduced once...
        let raw = 199i128 * 500 + 199i128 * 500;
        assert_eq!(round_cents_milli(raw), 199);
        // ...but 2.00 when each line is rounded separately.
        let per_line = round_cents_milli(199 * 500) * 2;
        assert_eq!(per_line, 200);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(div_round(100, 3), 33);
        assert_eq!(div_round(200, 3), 67);
        assert_eq!(div_round(-100, 3), -33);
        assert_eq!(div_round(-200, 3), -67);
        assert_eq!(div_round(5, 0), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
