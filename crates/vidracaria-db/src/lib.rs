//! # vidracaria-db: Data Access for the Glass Shop Back Office
//!
//! Generic table accessor consumed by the register lifecycle and the stock
//! and ledger commands. SQLite when a database path is configured, in-memory
//! demo tables otherwise.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vidraçaria Data Flow                               │
//! │                                                                         │
//! │  CashRegisterLifecycle::close()                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  vidracaria-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  RecordStore  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store/)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SqliteStore   │    │ 001_caixa    │  │   │
//! │  │   │               │    │ MemoryStore   │    │ 002_estoque  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file  (or demo tables in memory)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`store`] - RecordStore trait, SQLite and memory backends
//! - [`demo`] - Demo dataset
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vidracaria_db::{Database, DbConfig};
//! use vidracaria_db::store::{FetchOptions, OrderDirection, RecordStore};
//! use vidracaria_core::CashClosingRecord;
//!
//! let db = Database::new(DbConfig::new("vidracaria.db")).await?;
//! let history: Vec<CashClosingRecord> = db
//!     .store()
//!     .fetch_all(&FetchOptions::new().order_by("date", OrderDirection::Desc))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod demo;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::{
    FetchOptions, Filter, FilterOp, MemoryStore, OrderDirection, Record, RecordStore,
    SqliteStore, Updatable,
};
