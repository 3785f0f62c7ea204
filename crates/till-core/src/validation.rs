//! # Validation Module
//!
//! Input validation for product maintenance and search.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command (apps/till)                                           │
//! │  ├── Role gating (admin / manager)                                      │
//! │  └── THIS MODULE: field rules before any request is built               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend (products resource)                                   │
//! │  ├── Uniqueness of SKU                                                  │
//! │  └── Persistence constraints                                            │
//! │                                                                         │
//! │  A rejected field never reaches the network.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_sku, validate_stock};
//!
//! validate_sku("COKE-330").unwrap();
//! validate_stock(0).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductFields;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted SKU.
pub const MAX_SKU_LEN: usize = 50;

/// Longest accepted product name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted category.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Longest accepted search query.
pub const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.trim().chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches every product)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit amount (price or cost).
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, donated stock)
///
/// ## Example
/// ```rust
/// use till_core::{validation::validate_amount, Money};
///
/// assert!(validate_amount("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_amount("price", Money::zero()).is_ok());
/// assert!(validate_amount("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity (>= 0).
pub fn validate_stock(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a reorder threshold (>= 0).
pub fn validate_reorder_point(reorder_point: i64) -> ValidationResult<()> {
    if reorder_point < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "reorder_point".to_string(),
        });
    }

    Ok(())
}

/// Validates a tendered cash amount.
pub fn validate_tendered(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "tendered amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates every editable field of a product, stopping at the first
/// failure.
pub fn validate_product_fields(fields: &ProductFields) -> ValidationResult<()> {
    validate_product_name(&fields.name)?;
    validate_sku(&fields.sku)?;
    validate_category(&fields.category)?;
    validate_amount("price", fields.price)?;
    validate_amount("cost", fields.cost)?;
    validate_stock(fields.quantity)?;
    validate_reorder_point(fields.reorder_point)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
