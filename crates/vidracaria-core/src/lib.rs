//! # vidracaria-core: Pure Business Logic for the Glass Shop Back Office
//!
//! Cash register reconciliation, stock adjustment and ledger aggregation as
//! pure functions. Nothing in this crate touches a database, the network,
//! the file system or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vidraçaria Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    caixa CLI (clap)                             │   │
//! │  │    caixa open/move/close ──► estoque move ──► financas summary  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              Lifecycle + commands (apps/caixa)                  │   │
//! │  │    RegisterState, store timeouts, error mapping                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ vidracaria-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │ register │ │inventory │ finance  │   │
//! │  │   │  caixa   │ │  Money   │ │ balance  │ │  stock   │ monthly  │   │
//! │  │   │  estoque │ │  R$ fmt  │ │ close    │ │  alerts  │ category │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               vidracaria-db (Data Access)                       │   │
//! │  │         RecordStore: SQLite or in-memory demo tables            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (CashRegister, CashMovement, Product, ...)
//! - [`money`] - Money in integer centavos
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//! - [`register`] - Running balance and close reconciliation
//! - [`inventory`] - Stock movements and alerts
//! - [`finance`] - Ledger totals, monthly series, categories
//! - [`quote`] - Quote line and quote totals
//! - [`work_order`] - Work order status board
//!
//! ## Example Usage
//!
//! ```rust
//! use vidracaria_core::register::Reconciliation;
//! use vidracaria_core::Money;
//!
//! // Opened with R$ 200,00, no movements, R$ 150,00 counted at close
//! let rec = Reconciliation::compute(Money::from_cents(20000), &[], Money::from_cents(15000));
//!
//! assert_eq!(rec.system_amount.cents(), 20000);
//! assert_eq!(rec.difference.cents(), -5000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod finance;
pub mod inventory;
pub mod money;
pub mod quote;
pub mod register;
pub mod types;
pub mod validation;
pub mod work_order;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// `chrono` format of a time of day (`HH:MM`).
pub const TIME_FORMAT: &str = "%H:%M";

/// `chrono` format of a calendar date as stored (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum length of a movement or ledger description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Maximum length of free-text notes.
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Maximum length of a product code.
pub const MAX_CODE_LENGTH: usize = 30;

/// Largest amount accepted for a single opening, movement, closing, ledger
/// entry or unit price: R$ 10.000.000,00.
pub const MAX_AMOUNT: Money = Money::from_cents(1_000_000_000);

/// Largest stock quantity a product may hold or a movement may move.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Currency symbol used when formatting [`Money`].
pub const CURRENCY_SYMBOL: &str = "R$";
