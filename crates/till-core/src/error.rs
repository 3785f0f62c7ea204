//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                           │
//! │  ├── CartError        - Cart reducer rejections                         │
//! │  ├── ReportError      - Window boundaries that cannot be resolved       │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  till-client errors (separate crate)                                    │
//! │  └── ClientError      - Backend call failures                           │
//! │                                                                         │
//! │  App errors (apps/till)                                                 │
//! │  ├── CheckoutError    - Sale transaction outcomes                       │
//! │  └── ApiError         - What the operator sees (code + message)         │
//! │                                                                         │
//! │  Flow: CartError → ApiError → Operator                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failing cart operation leaves the cart exactly as it was, so the
//! error carries enough context (product, available, requested) for the
//! operator to correct the input and retry.

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Rejections from the cart reducer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Requested quantity below 1.
    #[error("Invalid quantity {requested} for product {product_id}")]
    InvalidQuantity { product_id: String, requested: i64 },

    /// The product has no stock at all.
    #[error("{name} is out of stock")]
    OutOfStock { product_id: String, name: String },

    /// The line would exceed stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap "Coffee" (1 in stock, 1 already in cart)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// "Only 1 Coffee in stock"
    /// ```
    #[error("Only {available} {name} in stock (requested {requested})")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product id absent from the catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product id has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },
}

// =============================================================================
// Report Error
// =============================================================================

/// Failures computing reporting windows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// A window boundary (local midnight) does not exist or is not unique
    /// in the reporting time zone, e.g. inside a DST transition.
    #[error("Local midnight of {date} cannot be resolved in the reporting time zone")]
    AmbiguousLocalTime { date: chrono::NaiveDate },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., SKU with spaces, unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CartResult<T> = Result<T, CartError>;

pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// Unit Tests
// =============================================================================
