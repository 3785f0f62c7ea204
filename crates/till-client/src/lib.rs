//! # till-client: Backend Collaborators for Till
//!
//! This crate owns every conversation with the backend. The app crate
//! depends on the [`CatalogService`] and [`SalesService`] traits; the
//! HTTP implementations live in [`http`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Collaborator Wiring                              │
//! │                                                                         │
//! │   TillConfig::load()                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Backend::new(&config)  (reqwest pool + base URL + token + timeout)    │
//! │        │                                                                │
//! │        ├──► HttpCatalogService ──► Arc<dyn CatalogService>              │
//! │        └──► HttpSalesService   ──► Arc<dyn SalesService>                │
//! │                                                                         │
//! │   Tests swap in MockCatalogService / MockSalesService instead.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod service;

pub use config::TillConfig;
pub use error::{ClientError, ClientResult};
pub use http::{Backend, HttpCatalogService, HttpSalesService};
pub use service::{CatalogService, MockCatalogService, MockSalesService, SalesService};
