//! # State Module
//!
//! Session-owned application state. Nothing here is global: a [`Session`]
//! is built once per run and every command borrows it.
//!
//! Each concern lives in its own state type, so a command only touches the
//! locks it needs and a test can stand up just the piece it exercises.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         Session                                 │   │
//! │  │  user: SessionUser        checkout: CheckoutCoordinator         │   │
//! │  │  catalog_service          sales_service   (Arc<dyn ...>)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │     ┌──────────────┬─────────┴────────┬──────────────────┐             │
//! │     ▼              ▼                  ▼                  ▼             │
//! │  ┌──────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐    │
//! │  │ConfigState│ │  CartState   │  │ CatalogState │  │SalesHistory │    │
//! │  │          │  │              │  │              │  │             │    │
//! │  │TillConfig│  │ Mutex<Cart>  │  │Mutex<Vec<    │  │Mutex<Vec<   │    │
//! │  │currency  │  │ Mutex<       │  │  Product>>   │  │ SaleRecord>>│    │
//! │  │timeout   │  │  PaymentInput>│ │              │  │             │    │
//! │  └──────────┘  └──────────────┘  └──────────────┘  └─────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • ConfigState: read-only after initialization                         │
//! │  • Cart, catalog and sales snapshots: Mutex, never held across .await  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod sales;
mod session;

pub use cart::{CartState, PaymentInput};
pub use catalog::CatalogState;
pub use config::ConfigState;
pub use sales::SalesHistory;
pub use session::Session;
