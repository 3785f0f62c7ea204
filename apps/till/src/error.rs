//! # API Error Type
//!
//! Unified error type for till commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till                                   │
//! │                                                                         │
//! │  Operator                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  till sell 7:2                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart rejected? ──── CartError::InsufficientStock ──┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Backend failed? ─── CheckoutError / ClientError ── ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  error [INSUFFICIENT_STOCK]: Only 1 Coffee in stock (requested 2)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `code` is stable and machine-readable; the `message` is for people.

use serde::Serialize;
use till_client::ClientError;
use till_core::{CartError, ReportError, Role, ValidationError};

use crate::checkout::CheckoutError;

/// Error returned from till commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 17"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or cart line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// The signed-in role may not do this
    Forbidden,

    OutOfStock,
    InsufficientStock,

    /// Any other cart rejection
    CartError,

    EmptyCart,

    /// Tender below total, unknown payment method
    PaymentError,

    CheckoutInProgress,

    /// The sale was not recorded
    SaleSubmissionFailed,

    /// The sale was recorded but stock levels were not all updated
    PartialInventorySync,

    RequestTimedOut,
    CollaboratorUnavailable,

    /// The backend answered with an error or an unreadable body
    BackendError,

    /// A report window could not be computed
    ReportError,

    /// Internal error (configuration, bugs)
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::OutOfStock => "OUT_OF_STOCK",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::CartError => "CART_ERROR",
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::CheckoutInProgress => "CHECKOUT_IN_PROGRESS",
            ErrorCode::SaleSubmissionFailed => "SALE_SUBMISSION_FAILED",
            ErrorCode::PartialInventorySync => "PARTIAL_INVENTORY_SYNC",
            ErrorCode::RequestTimedOut => "REQUEST_TIMED_OUT",
            ErrorCode::CollaboratorUnavailable => "COLLABORATOR_UNAVAILABLE",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::ReportError => "REPORT_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a permission error.
    pub fn forbidden(role: Role, action: &str) -> Self {
        ApiError::new(
            ErrorCode::Forbidden,
            format!("Role '{}' may not {}", role, action),
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CartError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CartError::InvalidQuantity { .. } => ErrorCode::ValidationError,
            CartError::ProductNotFound(_) | CartError::NotInCart(_) => ErrorCode::NotFound,
            CartError::CartTooLarge { .. } => ErrorCode::CartError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::new(ErrorCode::ReportError, err.to_string())
    }
}

/// Converts backend call failures to API errors.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.is_config_error() {
            tracing::error!("Configuration error: {}", err);
            return ApiError::internal(err.to_string());
        }

        let code = match &err {
            ClientError::Timeout(_) => ErrorCode::RequestTimedOut,
            e if e.is_unavailable() => ErrorCode::CollaboratorUnavailable,
            ClientError::Rejected { status: 404, .. } => ErrorCode::NotFound,
            _ => ErrorCode::BackendError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts checkout outcomes to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::CheckoutInProgress => ErrorCode::CheckoutInProgress,
            CheckoutError::EmptyCart => ErrorCode::EmptyCart,
            CheckoutError::InsufficientTender { .. } => ErrorCode::PaymentError,
            CheckoutError::SaleSubmissionFailed(_) => ErrorCode::SaleSubmissionFailed,
            CheckoutError::RequestTimedOut(_) => ErrorCode::RequestTimedOut,
            CheckoutError::CollaboratorUnavailable(_) => ErrorCode::CollaboratorUnavailable,
            CheckoutError::PartialInventorySync { .. } => ErrorCode::PartialInventorySync,
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
