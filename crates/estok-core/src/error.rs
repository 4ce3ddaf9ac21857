//! # Error Types
//!
//! Domain-specific error types for estok-core.
//!
//! ## Error Hierarchy
//! ```text
//! estok-core (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! estok-db (separate crate)
//! └── DbError          - Database operation failures
//!
//! apps/server
//! └── ApiError         - What HTTP clients see (code + message)
//!
//! Flow: ValidationError -> CoreError -> DbError -> ApiError -> client
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Context in messages (product id, quantities)
//! 3. Errors are enum variants, never bare strings

use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist (or was soft-deleted out of view).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// The stock policy forbids negative stock and this movement would
    /// drive the product below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., a lookup code that is not 13 digits).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-77".to_string(),
            available: Quantity::from_milli(3_000),
            requested: Quantity::from_milli(5_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p-77: available 3.000, requested 5.000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "description".to_string(),
        };
        assert_eq!(err.to_string(), "description is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
