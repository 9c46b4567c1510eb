//! # Vidraçaria Caixa Library
//!
//! Back office for the glass shop: the cash register lifecycle, stock
//! movements and the income/expense ledger, driven from the terminal.
//!
//! ## Module Organization
//! ```text
//! vidracaria_caixa/
//! ├── lib.rs          ◄─── You are here (logging & run)
//! ├── cli.rs          ◄─── clap arguments, dispatch, output
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── store.rs    ◄─── SQLite or demo store
//! │   ├── register.rs ◄─── Open register + movements
//! │   ├── clock.rs    ◄─── System / fixed clock
//! │   └── config.rs   ◄─── caixa.toml + env overrides
//! ├── commands/
//! │   ├── mod.rs      ◄─── Bounded store calls
//! │   ├── caixa.rs    ◄─── Open, movements, close, history
//! │   ├── estoque.rs  ◄─── Stock movements and alerts
//! │   ├── financas.rs ◄─── Ledger entries and reports
//! │   └── painel.rs   ◄─── Dashboard summary
//! └── error.rs        ◄─── Error type returned by commands
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (stderr, RUST_LOG overrides the default filter)  │
//! │  2. Parse arguments                                                     │
//! │  3. Load caixa.toml, apply VIDRACARIA_* overrides                       │
//! │  4. Connect the store (SQLite file, or demo tables)                     │
//! │  5. Load the open register, run the command, print the result           │
//! │  6. Close the store                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Parses the command line, runs it and maps the outcome to an exit code.
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    info!(command = ?cli.command, "Starting caixa");

    match cli::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = %e.code, message = %e.message, "Command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vidracaria=trace` - Trace for the vidracaria crates only
/// - Default: INFO, DEBUG for vidracaria
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vidracaria=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
