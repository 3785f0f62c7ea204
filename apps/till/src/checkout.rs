//! # Checkout Coordinator
//!
//! Turns the cart into a recorded sale and reconciles catalog stock.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Sequence                                │
//! │                                                                         │
//! │  1. Guard ──────── phase Idle|Complete → Submitting                     │
//! │                    anything else → CheckoutInProgress                   │
//! │  2. Precheck ───── empty cart → EmptyCart (no network)                  │
//! │                    cash tendered < total → InsufficientTender           │
//! │  3. Draft ──────── frozen lines, cashier, payment, now, cart total      │
//! │  4. Submit ─────── SalesService::record_sale                            │
//! │                    failure → SaleSubmissionFailed / RequestTimedOut /   │
//! │                              CollaboratorUnavailable (cart untouched)   │
//! │  5. Reconcile ──── phase Syncing                                        │
//! │                    CatalogService::set_quantity for every line,         │
//! │                    concurrently, all attempted                          │
//! │  6. Finish ─────── clear cart + payment, phase Complete                 │
//! │                    any failed line → PartialInventorySync (logged)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Phase Machine
//! ```text
//!              begin()               sale recorded
//!   ┌──────┐ ──────────► ┌────────────┐ ──────────► ┌─────────┐
//!   │ Idle │             │ Submitting │             │ Syncing │
//!   └──────┘ ◄────────── └────────────┘             └────┬────┘
//!      ▲  ▲    failure                                   │ all lines attempted
//!      │  │                                              ▼
//!      │  └──────────────── reset() ─────────────── ┌──────────┐
//!      │                                            │ Complete │
//!      └─────────── begin() allowed again ───────── └──────────┘
//! ```
//!
//! A sale is never rolled back: once recorded it is durable, so a failed
//! stock decrement is surfaced and logged for manual reconciliation and the
//! cart is still cleared. Resubmitting would record the sale twice.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use till_client::{CatalogService, ClientError, ClientResult, SalesService};
use till_core::{Money, PaymentMethod, SaleDraft, SaleRecord};

use crate::state::{CartState, CatalogState, PaymentInput};

// =============================================================================
// Phase
// =============================================================================

/// Where the coordinator is in the sale transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Submitting,
    Syncing,
    Complete,
}

impl CheckoutPhase {
    /// True while a checkout holds the cart.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, CheckoutPhase::Submitting | CheckoutPhase::Syncing)
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// A line whose stock decrement failed after the sale was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDecrement {
    pub product_id: String,
    pub product_name: String,

    /// The quantity the catalog should have been set to.
    pub intended_quantity: i64,
    pub reason: String,
}

/// Result of a completed checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReceipt {
    pub sale: SaleRecord,

    /// Cash to hand back, when a tendered amount was entered.
    pub change_due: Option<Money>,
}

/// Checkout failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Tendered {tendered} is less than the total {total}")]
    InsufficientTender { total: Money, tendered: Money },

    #[error("Sale could not be recorded: {0}")]
    SaleSubmissionFailed(String),

    #[error("Backend did not answer within {} ms", .0.as_millis())]
    RequestTimedOut(Duration),

    #[error("Backend unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// The sale is recorded but some stock levels were not updated.
    #[error("Sale recorded but stock update failed for {} product(s)", .failed.len())]
    PartialInventorySync {
        receipt: Box<CheckoutReceipt>,
        failed: Vec<FailedDecrement>,
    },
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

impl CheckoutError {
    /// Classifies a failed sale submission.
    fn from_submission(err: ClientError, timeout: Duration) -> Self {
        match err {
            ClientError::Timeout(elapsed) if elapsed.is_zero() => CheckoutError::RequestTimedOut(timeout),
            ClientError::Timeout(elapsed) => CheckoutError::RequestTimedOut(elapsed),
            ClientError::Unavailable(detail) | ClientError::Http(detail) => {
                CheckoutError::CollaboratorUnavailable(detail)
            }
            other if other.is_unavailable() => CheckoutError::CollaboratorUnavailable(other.to_string()),
            other => CheckoutError::SaleSubmissionFailed(other.to_string()),
        }
    }
}

// =============================================================================
// In-Flight Guard
// =============================================================================

/// Holds the phase while a checkout runs.
///
/// Dropping the guard without [`InFlight::complete`] returns the phase to
/// `Idle`, including when the checkout future itself is dropped mid-await.
struct InFlight<'a> {
    phase: &'a Mutex<CheckoutPhase>,
    completed: bool,
}

impl<'a> InFlight<'a> {
    fn set(&self, next: CheckoutPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn complete(mut self) {
        self.set(CheckoutPhase::Complete);
        self.completed = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.set(CheckoutPhase::Idle);
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs the sale transaction against the backend collaborators.
pub struct CheckoutCoordinator {
    catalog: Arc<dyn CatalogService>,
    sales: Arc<dyn SalesService>,
    timeout: Duration,
    phase: Mutex<CheckoutPhase>,
}

impl std::fmt::Debug for CheckoutCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutCoordinator")
            .field("timeout", &self.timeout)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl CheckoutCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        sales: Arc<dyn SalesService>,
        timeout: Duration,
    ) -> Self {
        CheckoutCoordinator {
            catalog,
            sales,
            timeout,
            phase: Mutex::new(CheckoutPhase::Idle),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase().is_in_flight()
    }

    /// Returns to `Idle` from any phase.
    pub fn reset(&self) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = CheckoutPhase::Idle;
    }

    #[cfg(test)]
    pub(crate) fn force_phase(&self, phase: CheckoutPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn begin(&self) -> CheckoutResult<InFlight<'_>> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if phase.is_in_flight() {
            return Err(CheckoutError::CheckoutInProgress);
        }
        *phase = CheckoutPhase::Submitting;
        Ok(InFlight {
            phase: &self.phase,
            completed: false,
        })
    }

    /// Bounds a collaborator call by the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    /// Checks out the cart.
    ///
    /// ## Errors
    /// - `CheckoutInProgress` while another checkout holds the cart
    /// - `EmptyCart` with no network call made
    /// - `InsufficientTender` for cash below the total
    /// - `SaleSubmissionFailed`, `RequestTimedOut`, `CollaboratorUnavailable`
    ///   when the sale was not recorded; the cart is untouched
    /// - `PartialInventorySync` when the sale was recorded but some stock
    ///   levels were not; the cart is cleared
    pub async fn checkout(
        &self,
        cart: &CartState,
        catalog: &CatalogState,
        cashier_id: &str,
        now: DateTime<Utc>,
    ) -> CheckoutResult<CheckoutReceipt> {
        let flight = self.begin()?;

        let (lines, items, total) =
            cart.with_cart(|c| (c.lines().to_vec(), c.sale_items(), c.total()));
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let PaymentInput { method, tendered } = cart.payment();
        let change_due = change_due(&method, tendered, total)?;

        let draft = SaleDraft {
            cashier_id: cashier_id.to_string(),
            items,
            payment_method: method,
            timestamp: now,
            total,
        };

        debug!(cashier_id, lines = lines.len(), total = %total, "Submitting sale");
        let sale = self
            .bounded(self.sales.record_sale(&draft))
            .await
            .map_err(|err| {
                warn!(error = %err, "Sale submission failed");
                CheckoutError::from_submission(err, self.timeout)
            })?;

        flight.set(CheckoutPhase::Syncing);
        let sale_id = sale.id.as_deref().unwrap_or("<unassigned>").to_string();

        // Decrement against the freshest known stock, falling back to the
        // snapshot frozen into the line.
        let decrements: Vec<_> = lines
            .iter()
            .map(|line| {
                let on_hand = catalog
                    .find(line.product_id())
                    .map_or(line.product.quantity, |p| p.quantity);
                (line, on_hand - line.cart_quantity)
            })
            .collect();

        let results = join_all(decrements.iter().map(|(line, new_quantity)| {
            self.bounded(self.catalog.set_quantity(line.product_id(), *new_quantity))
        }))
        .await;

        let mut failed = Vec::new();
        for ((line, new_quantity), result) in decrements.into_iter().zip(results) {
            match result {
                Ok(_) => catalog.apply_quantity(line.product_id(), new_quantity),
                Err(err) => failed.push(FailedDecrement {
                    product_id: line.product_id().to_string(),
                    product_name: line.product.name.clone(),
                    intended_quantity: new_quantity,
                    reason: err.to_string(),
                }),
            }
        }

        cart.reset();
        flight.complete();

        if !failed.is_empty() {
            let failed_ids: Vec<&str> = failed.iter().map(|f| f.product_id.as_str()).collect();
            error!(
                sale_id = %sale_id,
                failed = ?failed_ids,
                "Sale recorded but stock update failed; reconcile these products manually"
            );
            return Err(CheckoutError::PartialInventorySync {
                receipt: Box::new(CheckoutReceipt { sale, change_due }),
                failed,
            });
        }

        info!(sale_id = %sale_id, total = %total, "Sale completed");
        Ok(CheckoutReceipt { sale, change_due })
    }
}

/// Change owed for a tendered cash amount.
fn change_due(
    method: &PaymentMethod,
    tendered: Option<Money>,
    total: Money,
) -> CheckoutResult<Option<Money>> {
    match tendered {
        Some(tendered) if method.takes_tender() => {
            if tendered < total {
                return Err(CheckoutError::InsufficientTender { total, tendered });
            }
            Ok(Some(tendered - total))
        }
        _ => Ok(None),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use till_client::{MockCatalogService, MockSalesService};
    use till_core::Product;

    fn product(id: &str, price: i64, cost: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            category: String::new(),
            price: Money::from_major_minor(price, 0),
            cost: Money::from_major_minor(cost, 0),
            quantity,
            reorder_point: 0,
            icon: None,
            barcode: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 15, 0).unwrap()
    }

    fn echo_sales() -> MockSalesService {
        let mut sales = MockSalesService::new();
        sales
            .expect_record_sale()
            .times(1)
            .returning(|draft| Ok(SaleRecord::from_draft(Some("42".to_string()), draft.clone())));
        sales
    }

    fn coordinator(catalog: MockCatalogService, sales: MockSalesService) -> CheckoutCoordinator {
        CheckoutCoordinator::new(Arc::new(catalog), Arc::new(sales), Duration::from_secs(5))
    }

    fn stocked(products: &[Product]) -> (CartState, CatalogState) {
        let catalog = CatalogState::new();
        catalog.replace(products.to_vec());
        (CartState::new(), catalog)
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_calls() {
        let mut catalog = MockCatalogService::new();
        catalog.expect_set_quantity().never();
        let mut sales = MockSalesService::new();
        sales.expect_record_sale().never();
        let coordinator = coordinator(catalog, sales);
        let (cart, snapshot) = stocked(&[]);

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert_eq!(err, CheckoutError::EmptyCart);
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn test_successful_checkout() {
        let coffee = product("1", 100, 60, 5);
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_set_quantity()
            .withf(|id, qty| id == "1" && *qty == 3)
            .times(1)
            .returning(|_, _| Ok(product("1", 100, 60, 3)));
        let coordinator = coordinator(catalog, echo_sales());
        let (cart, snapshot) = stocked(&[coffee.clone()]);
        cart.with_cart_mut(|c| c.add_item(&coffee, 2)).unwrap();
        cart.set_payment(PaymentInput {
            method: PaymentMethod::Cash,
            tendered: Some(Money::from_major_minor(500, 0)),
        });

        let receipt = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap();

        assert_eq!(receipt.sale.id.as_deref(), Some("42"));
        assert_eq!(receipt.sale.total, Money::from_major_minor(200, 0));
        assert_eq!(receipt.sale.profit(), Money::from_major_minor(80, 0));
        assert_eq!(receipt.sale.timestamp, Some(now()));
        assert_eq!(receipt.change_due, Some(Money::from_major_minor(300, 0)));
        assert!(cart.with_cart(|c| c.is_empty()));
        assert_eq!(cart.payment(), PaymentInput::default());
        assert_eq!(snapshot.find("1").map(|p| p.quantity), Some(3));
        assert_eq!(coordinator.phase(), CheckoutPhase::Complete);
    }

    #[tokio::test]
    async fn test_submission_failure_leaves_cart_untouched() {
        let tea = product("1", 50, 20, 4);
        let mut catalog = MockCatalogService::new();
        catalog.expect_set_quantity().never();
        let mut sales = MockSalesService::new();
        sales.expect_record_sale().times(1).returning(|_| {
            Err(ClientError::Rejected {
                status: 422,
                message: "cashierId is required".to_string(),
            })
        });
        let coordinator = coordinator(catalog, sales);
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 2)).unwrap();
        let before = cart.with_cart(|c| c.clone());

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::SaleSubmissionFailed(_)));
        assert_eq!(cart.with_cart(|c| c.clone()), before);
        assert_eq!(snapshot.find("1").map(|p| p.quantity), Some(4));
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let tea = product("1", 50, 20, 4);
        let mut sales = MockSalesService::new();
        sales
            .expect_record_sale()
            .returning(|_| Err(ClientError::Unavailable("connection refused".to_string())));
        let coordinator = coordinator(MockCatalogService::new(), sales);
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 1)).unwrap();

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::CollaboratorUnavailable(_)));
        assert_eq!(cart.with_cart(|c| c.item_count()), 1);
    }

    #[tokio::test]
    async fn test_server_error_means_backend_unavailable() {
        let tea = product("1", 50, 20, 4);
        let mut sales = MockSalesService::new();
        sales.expect_record_sale().times(1).returning(|_| {
            Err(ClientError::Rejected {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        });
        let coordinator = coordinator(MockCatalogService::new(), sales);
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 1)).unwrap();

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::CollaboratorUnavailable(_)));
        assert_eq!(cart.with_cart(|c| c.item_count()), 1);
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_transport_failure_means_backend_unavailable() {
        let err = CheckoutError::from_submission(
            ClientError::Http("connection reset".to_string()),
            Duration::from_secs(5),
        );
        assert_eq!(err, CheckoutError::CollaboratorUnavailable("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_partial_sync_is_reported_and_cart_cleared() {
        let a = product("a", 10, 5, 10);
        let b = product("b", 20, 5, 10);
        let c = product("c", 30, 5, 1);
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_set_quantity()
            .times(3)
            .returning(|id, qty| match id {
                "b" => Err(ClientError::Rejected {
                    status: 409,
                    message: "version conflict".to_string(),
                }),
                _ => Ok(product(id, 1, 1, qty)),
            });
        let coordinator = coordinator(catalog, echo_sales());
        let (cart, snapshot) = stocked(&[a.clone(), b.clone(), c.clone()]);
        cart.with_cart_mut(|cart| {
            cart.add_item(&a, 2)?;
            cart.add_item(&b, 3)?;
            cart.add_item(&c, 1)
        })
        .unwrap();
        cart.set_payment(PaymentInput {
            method: PaymentMethod::Cash,
            tendered: Some(Money::from_major_minor(200, 0)),
        });

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        match err {
            CheckoutError::PartialInventorySync { receipt, failed } => {
                assert_eq!(receipt.sale.id.as_deref(), Some("42"));
                // 2x10 + 3x20 + 1x30
                assert_eq!(receipt.change_due, Some(Money::from_major_minor(90, 0)));
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].product_id, "b");
                assert_eq!(failed[0].intended_quantity, 7);
            }
            other => panic!("expected partial sync, got {:?}", other),
        }
        assert!(cart.with_cart(|cart| cart.is_empty()));
        assert_eq!(snapshot.find("a").map(|p| p.quantity), Some(8));
        assert_eq!(snapshot.find("b").map(|p| p.quantity), Some(10));
        // Sold out: dropped from the snapshot.
        assert!(snapshot.find("c").is_none());
        assert_eq!(coordinator.phase(), CheckoutPhase::Complete);
    }

    #[tokio::test]
    async fn test_insufficient_tender() {
        let tea = product("1", 50, 20, 4);
        let mut sales = MockSalesService::new();
        sales.expect_record_sale().never();
        let coordinator = coordinator(MockCatalogService::new(), sales);
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 2)).unwrap();
        cart.set_payment(PaymentInput {
            method: PaymentMethod::Cash,
            tendered: Some(Money::from_major_minor(99, 0)),
        });

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::InsufficientTender { .. }));
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_tender_ignored_for_non_cash() {
        let total = Money::from_major_minor(100, 0);
        let change = change_due(&PaymentMethod::Mpesa, Some(Money::zero()), total).unwrap();
        assert_eq!(change, None);
    }

    /// Never answers a sale submission.
    struct StalledSales;

    #[async_trait]
    impl SalesService for StalledSales {
        async fn list_sales(&self) -> ClientResult<Vec<SaleRecord>> {
            Ok(Vec::new())
        }

        async fn record_sale(&self, _draft: &SaleDraft) -> ClientResult<SaleRecord> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_submission_times_out() {
        let tea = product("1", 50, 20, 4);
        let coordinator = CheckoutCoordinator::new(
            Arc::new(MockCatalogService::new()),
            Arc::new(StalledSales),
            Duration::from_secs(5),
        );
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 1)).unwrap();

        let err = coordinator.checkout(&cart, &snapshot, "c1", now()).await.unwrap_err();

        assert_eq!(err, CheckoutError::RequestTimedOut(Duration::from_secs(5)));
        assert_eq!(cart.with_cart(|c| c.item_count()), 1);
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_checkout_while_in_flight_is_rejected() {
        let tea = product("1", 50, 20, 4);
        let coordinator = CheckoutCoordinator::new(
            Arc::new(MockCatalogService::new()),
            Arc::new(StalledSales),
            Duration::from_secs(5),
        );
        let (cart, snapshot) = stocked(&[tea.clone()]);
        cart.with_cart_mut(|c| c.add_item(&tea, 1)).unwrap();

        let first = coordinator.checkout(&cart, &snapshot, "c1", now());
        let second = async {
            // Let the first checkout reach its submission.
            tokio::task::yield_now().await;
            assert_eq!(coordinator.phase(), CheckoutPhase::Submitting);
            coordinator.checkout(&cart, &snapshot, "c1", now()).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second.unwrap_err(), CheckoutError::CheckoutInProgress);
        assert!(matches!(first, Err(CheckoutError::RequestTimedOut(_))));
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let coordinator = coordinator(MockCatalogService::new(), MockSalesService::new());
        *coordinator.phase.lock().unwrap() = CheckoutPhase::Syncing;
        coordinator.reset();
        assert_eq!(coordinator.phase(), CheckoutPhase::Idle);
    }
}
