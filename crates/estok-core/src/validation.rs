//! # Validation Module
//!
//! Input validation for catalog and sale operations. Every mutating
//! operation validates here before touching the store, so malformed input
//! fails fast with a [`ValidationError`] and never opens a transaction.

use crate::error::ValidationError;
use crate::types::{NewProduct, NewSaleLine, ProductPatch};
use crate::{EAN13_LEN, MAX_AUX_CODE_LEN, MAX_DESCRIPTION_LEN, MAX_SEARCH_QUERY_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product description.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 255 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates the primary lookup code: exactly 13 ASCII digits.
///
/// ## Example
/// ```rust
/// use estok_core::validation::validate_ean13;
///
/// assert!(validate_ean13("7891000315507").is_ok());
/// assert!(validate_ean13("12345").is_err());
/// assert!(validate_ean13("789100031550X").is_err());
/// ```
pub fn validate_ean13(code: &str) -> ValidationResult<()> {
    if code.len() != EAN13_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "ean13".to_string(),
            reason: format!("must be exactly {} digits", EAN13_LEN),
        });
    }

    Ok(())
}

/// Validates the auxiliary lookup code (short code typed at the register).
pub fn validate_aux_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "aux_code".to_string(),
        });
    }

    if code.len() > MAX_AUX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "aux_code".to_string(),
            max: MAX_AUX_CODE_LEN,
        });
    }

    Ok(())
}

/// Validates a search query. Empty is allowed (returns the default listing);
/// the trimmed query is returned.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a unit price in cents. Zero is allowed (giveaway lines).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Operation Input Validators
// =============================================================================

/// Validates a product creation request.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_description(&input.description)?;

    if let Some(ref code) = input.ean13 {
        validate_ean13(code)?;
    }
    if let Some(ref code) = input.aux_code {
        validate_aux_code(code)?;
    }
    if let Some(cents) = input.cost_cents {
        if cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "cost".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }
    if let Some(cents) = input.price_cents {
        validate_price_cents(cents)?;
    }

    Ok(())
}

/// Validates a partial product update. Only present fields are checked;
/// `Some(None)` (explicit clear) is always legal for nullable fields.
pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(ref description) = patch.description {
        validate_description(description)?;
    }
    if let Some(Some(ref code)) = patch.ean13 {
        validate_ean13(code)?;
    }
    if let Some(Some(ref code)) = patch.aux_code {
        validate_aux_code(code)?;
    }
    if let Some(Some(cents)) = patch.cost_cents {
        if cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "cost".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }
    if let Some(Some(cents)) = patch.price_cents {
        validate_price_cents(cents)?;
    }

    Ok(())
}

/// Validates one checkout line: positive quantity, non-negative price.
pub fn validate_sale_line(line: &NewSaleLine) -> ValidationResult<()> {
    if line.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if line.quantity_milli <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    validate_price_cents(line.unit_price_cents)?;

    Ok(())
}

/// Validates a whole checkout request: at least one line, all lines valid.
pub fn validate_sale_lines(lines: &[NewSaleLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    for line in lines {
        validate_sale_line(line)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
