//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Recorded │       │
//! │  │  Cart    │     │          │     │  Input   │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart       set_payment                         │
//! │                   update_cart_item  checkout (sale.rs)                  │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! While a checkout is in flight the cart belongs to the coordinator, and
//! every mutation here fails with `CHECKOUT_IN_PROGRESS`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use till_core::validation::validate_tendered;
use till_core::{Cart, CartLine, CartTotals, Money, PaymentMethod};

use crate::checkout::CheckoutError;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{PaymentInput, Session};

/// Cart contents with calculated totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

fn ensure_cart_unlocked(session: &Session) -> ApiResult<()> {
    if session.checkout.is_in_flight() {
        return Err(CheckoutError::CheckoutInProgress.into());
    }
    Ok(())
}

/// Gets the current cart contents.
pub fn get_cart(session: &Session) -> CartResponse {
    debug!("get_cart command");
    session.cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a product from the catalog snapshot to the cart.
///
/// ## Behavior
/// - Already in cart: the line's quantity increases
/// - Not in cart: added as a new line with the product frozen as it is now
/// - Never exceeds the snapshot's stock; a rejected add leaves the cart as is
///
/// ## Arguments
/// * `product_id` - Product id in the catalog snapshot
/// * `quantity` - Quantity to add (default: 1)
pub fn add_to_cart(
    session: &Session,
    product_id: &str,
    quantity: Option<i64>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");
    ensure_cart_unlocked(session)?;

    let product = session
        .catalog
        .find(product_id)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    session.cart.with_cart_mut(|cart| -> ApiResult<CartResponse> {
        cart.add_item(&product, quantity)?;
        Ok(CartResponse::from(&*cart))
    })
}

/// Sets the quantity of a line, checked against the catalog snapshot.
pub fn update_cart_item(
    session: &Session,
    product_id: &str,
    quantity: i64,
) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");
    ensure_cart_unlocked(session)?;

    session.catalog.with_products(|products| {
        session.cart.with_cart_mut(|cart| -> ApiResult<CartResponse> {
            cart.set_quantity(product_id, quantity, products)?;
            Ok(CartResponse::from(&*cart))
        })
    })
}

/// Removes a line from the cart. Removing an absent product is a no-op.
pub fn remove_from_cart(session: &Session, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "remove_from_cart command");
    ensure_cart_unlocked(session)?;

    Ok(session.cart.with_cart_mut(|cart| {
        cart.remove_item(product_id);
        CartResponse::from(&*cart)
    }))
}

/// Empties the cart.
pub fn clear_cart(session: &Session) -> ApiResult<CartResponse> {
    debug!("clear_cart command");
    ensure_cart_unlocked(session)?;

    Ok(session.cart.with_cart_mut(|cart| {
        cart.clear();
        CartResponse::from(&*cart)
    }))
}

/// Records how the customer is paying.
///
/// A tendered amount only applies to cash and must be positive; it is
/// compared against the total at checkout.
pub fn set_payment(
    session: &Session,
    method: PaymentMethod,
    tendered: Option<Money>,
) -> ApiResult<PaymentInput> {
    debug!(method = %method.as_str(), tendered = ?tendered, "set_payment command");
    ensure_cart_unlocked(session)?;

    if let Some(amount) = tendered {
        if !method.takes_tender() {
            return Err(ApiError::new(
                ErrorCode::PaymentError,
                format!("A tendered amount does not apply to {} payments", method.as_str()),
            ));
        }
        validate_tendered(amount)?;
    }

    let payment = PaymentInput { method, tendered };
    session.cart.set_payment(payment.clone());
    Ok(payment)
}

// =============================================================================
// Unit Tests
// =============================================================================
