//! # Sale Commands
//!
//! Checkout and the "new sale" reset.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Completion                                      │
//! │                                                                         │
//! │  checkout(session, now)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutCoordinator::checkout ──── see checkout.rs                     │
//! │       │                                                                 │
//! │       ├── Ok(receipt) ───────────────► sales history += receipt.sale    │
//! │       │                                                                 │
//! │       ├── PartialInventorySync ──────► sales history += sale            │
//! │       │                                (sale is durable; error returned)│
//! │       │                                                                 │
//! │       └── any other error ───────────► nothing recorded                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::checkout::{CheckoutError, CheckoutReceipt};
use crate::error::ApiResult;
use crate::state::Session;

/// Checks out the session's cart as the signed-in user.
///
/// The coordinator's typed outcome is returned unchanged so the caller can
/// list the products that need manual reconciliation after a partial sync.
pub async fn checkout(
    session: &Session,
    now: DateTime<Utc>,
) -> Result<CheckoutReceipt, CheckoutError> {
    debug!(cashier_id = %session.user.id, "checkout command");

    let outcome = session
        .checkout
        .checkout(&session.cart, &session.catalog, &session.user.id, now)
        .await;

    match &outcome {
        Ok(receipt) => session.sales.push(receipt.sale.clone()),
        Err(CheckoutError::PartialInventorySync { receipt, .. }) => {
            session.sales.push(receipt.sale.clone())
        }
        Err(_) => {}
    }
    outcome
}

/// Starts a fresh sale: empties the cart and payment input and returns the
/// coordinator to idle.
pub fn start_new_sale(session: &Session) -> ApiResult<()> {
    debug!("start_new_sale command");
    if session.checkout.is_in_flight() {
        return Err(CheckoutError::CheckoutInProgress.into());
    }

    session.cart.reset();
    session.checkout.reset();
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
