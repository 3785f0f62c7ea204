//! # Cart State
//!
//! Holds the session's one active cart and the payment input of the sale
//! being rung up.
//!
//! ## Thread Safety
//! Both are wrapped in `Mutex` because:
//! 1. Commands and the checkout coordinator all touch the cart
//! 2. Only one of them should modify it at a time
//! 3. No lock is ever held across an `.await`
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Operator Action          Command                 Cart State Change     │
//! │  ───────────────          ───────                 ─────────────────     │
//! │                                                                         │
//! │  Tap product ────────────► add_to_cart() ───────► cart.add_item()       │
//! │                                                                         │
//! │  Change quantity ────────► update_cart_item() ──► cart.set_quantity()   │
//! │                                                                         │
//! │  Trash icon ─────────────► remove_from_cart() ──► cart.remove_item()    │
//! │                                                                         │
//! │  Pick cash / M-Pesa ─────► set_payment() ───────► payment = ...         │
//! │                                                                         │
//! │  New sale ───────────────► start_new_sale() ────► reset()               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use till_core::{Cart, Money, PaymentMethod};

/// Payment details entered on the sale screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,

    /// Cash handed over by the customer, if entered.
    pub tendered: Option<Money>,
}

/// Session-owned cart state.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Mutex<Cart>,
    payment: Mutex<PaymentInput>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(CartTotals::from);
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    pub fn payment(&self) -> PaymentInput {
        self.payment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_payment(&self, payment: PaymentInput) {
        *self.payment.lock().unwrap_or_else(PoisonError::into_inner) = payment;
    }

    /// Clears the cart and the payment input.
    pub fn reset(&self) {
        self.with_cart_mut(Cart::clear);
        self.set_payment(PaymentInput::default());
    }
}
