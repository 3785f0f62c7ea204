//! # Till Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        till (binary)                                    │
//! │                                                                         │
//! │  main.rs ────► logging, argument parsing, exit code                    │
//! │                                                                         │
//! │  cli.rs ─────► config load, Session::connect, command dispatch         │
//! │                                                                         │
//! │  commands/ ──► refresh_catalog, add_to_cart, checkout, sales_report    │
//! │                                                                         │
//! │  backend ────► /products and /sales over HTTP                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Parse arguments
//! 3. Load configuration (defaults, file, environment)
//! 4. Open the session and run the command
//! 5. Print the output, or the error with its code

use std::process::ExitCode;

use clap::Parser;
use till::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    till::init_tracing();

    match cli::run(Cli::parse()).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error [{}]: {}", err.code, err.message);
            ExitCode::FAILURE
        }
    }
}
