//! # Commands Module
//!
//! Every operator action, as a thin function over a borrowed [`Session`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── products.rs  ◄─── Catalog fetch, search, low stock, CRUD
//! ├── cart.rs      ◄─── Cart manipulation and payment input
//! ├── sale.rs      ◄─── Checkout and "new sale"
//! └── report.rs    ◄─── Sales and profit windows, dashboard
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  main.rs (clap)                                                         │
//! │  ──────────────                                                         │
//! │  till sell --payment cash 7:2 9                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::cart::add_to_cart(&session, "7", Some(2))                    │
//! │         │      ├── reads session.catalog (snapshot)                     │
//! │         │      └── mutates session.cart via with_cart_mut               │
//! │         ▼                                                               │
//! │  commands::sale::checkout(&session, Utc::now())                         │
//! │         │      └── session.checkout coordinator ──► backend             │
//! │         ▼                                                               │
//! │  Result<T, ApiError>  ──► printed by main.rs                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Report commands take `now` as a parameter; nothing below `main.rs`
//! reads the clock.
//!
//! [`Session`]: crate::state::Session

pub mod cart;
pub mod products;
pub mod report;
pub mod sale;
