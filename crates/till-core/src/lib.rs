//! # till-core: Pure Business Logic for Till
//!
//! This crate is the **heart** of Till. It contains the cart, the sales
//! aggregation and the profit reporting as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/till (CLI + Session)                    │   │
//! │  │    products ──► cart ──► checkout ──► reports / dashboard       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ till-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  Window   │  │   │
//! │  │   │SaleRecord │  │  (cents)  │  │ CartLine  │  │  profit   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                till-client (Backend Collaborators)              │   │
//! │  │              /products and /sales over HTTP + JSON              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, SaleRecord, SaleItem, Role, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart reducer
//! - [`report`] - Window bucketing, sales and profit sums, dashboard
//! - [`error`] - Domain error types
//! - [`validation`] - Product field rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; `now` is always a parameter
//! 2. **No I/O**: network and file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Cart, Money, Product};
//!
//! let coffee: Product = serde_json::from_str(
//!     r#"{"id": 1, "name": "Coffee", "price": 100, "cost": 60, "quantity": 5}"#,
//! ).unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(&coffee, 2).unwrap();
//! assert_eq!(cart.total(), Money::from_major_minor(200, 0));
//! assert_eq!(cart.estimated_profit(), Money::from_major_minor(80, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CartError, ReportError, ValidationError};
pub use money::Money;
pub use report::{DashboardSummary, Window, WindowSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a sale submission to a reasonable size.
pub const MAX_CART_ITEMS: usize = 100;

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY: &str = "Ksh";
