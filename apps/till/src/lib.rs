//! # Till Application Library
//!
//! Session state, the checkout coordinator, operator commands and the
//! command-line front end for a single till.
//!
//! ## Module Organization
//! ```text
//! till/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── main.rs         ◄─── Binary entry point
//! ├── cli.rs          ◄─── clap arguments, output rendering
//! ├── checkout.rs     ◄─── Sale transaction and phase machine
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Session (owns everything below)
//! │   ├── cart.rs     ◄─── Cart and payment input
//! │   ├── catalog.rs  ◄─── Catalog snapshot
//! │   ├── sales.rs    ◄─── Sales snapshot
//! │   └── config.rs   ◄─── Loaded configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── products.rs ◄─── Catalog commands
//! │   ├── cart.rs     ◄─── Cart commands
//! │   ├── sale.rs     ◄─── Checkout commands
//! │   └── report.rs   ◄─── Report and dashboard commands
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Session Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    No Global State                                      │
//! │                                                                         │
//! │  main ──► Session::connect(config, user)                                │
//! │                │                                                        │
//! │                ├──► &Session ──► commands::products::*                  │
//! │                ├──► &Session ──► commands::cart::*                      │
//! │                ├──► &Session ──► commands::sale::*                      │
//! │                └──► &Session ──► commands::report::*                    │
//! │                                                                         │
//! │  Tests build their own Session over mock collaborators.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

use tracing_subscriber::EnvFilter;

pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutPhase, CheckoutReceipt};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::Session;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - Default: INFO, DEBUG for the till crates
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,till_client=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
