//! # Command Error Type
//!
//! Unified error type returned by every command.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Caixa App                          │
//! │                                                                         │
//! │  caixa close --amount 650                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CashRegisterLifecycle::close()                                  │  │
//! │  │  Result<T, CaixaError>                                           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store failed? ─── DbError::QueryFailed / Timeout ──┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Rule broken? ─── CoreError::InvalidState ──── CaixaError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [INVALID_STATE] No cash register is open                      │
//! │  --json: { "code": "INVALID_STATE", "message": "..." }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use vidracaria_core::{CoreError, ValidationError};
use vidracaria_db::DbError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PERSISTENCE_FAILURE",
///   "message": "Timed out after 10s: insert caixa_movimentacoes"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[error("[{code}] {message}")]
pub struct CaixaError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed validation; nothing was written
    ValidationError,

    /// Operation not allowed in the current register state
    InvalidState,

    /// The store rejected, failed or timed out on a call
    PersistenceFailure,

    /// Referenced record does not exist
    NotFound,

    /// Stock exit larger than what is on hand
    InsufficientStock,

    /// Configuration could not be loaded or is invalid
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CaixaError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CaixaError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CaixaError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CaixaError::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CaixaError::new(ErrorCode::InvalidState, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        CaixaError::new(ErrorCode::PersistenceFailure, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        CaixaError::new(ErrorCode::ConfigError, message)
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

pub type CaixaResult<T> = Result<T, CaixaError>;

/// Store errors. Everything except a missing record or a bad column name is a
/// persistence failure.
impl From<DbError> for CaixaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CaixaError::not_found(&entity, &id),
            DbError::UnknownColumn { table, column } => {
                CaixaError::validation(format!("Unknown column '{}' in {}", column, table))
            }
            DbError::UniqueViolation { field, value } => {
                CaixaError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CaixaError::validation("Invalid reference")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Query failed: {}", e);
                CaixaError::persistence("Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                CaixaError::persistence("Database operation failed")
            }
            other => CaixaError::persistence(other.to_string()),
        }
    }
}

impl From<CoreError> for CaixaError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidState(message) => CaixaError::invalid_state(message),
            e @ CoreError::InvalidRegisterStatus { .. } => CaixaError::invalid_state(e.to_string()),
            e @ CoreError::InsufficientStock { .. } => {
                CaixaError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for CaixaError {
    fn from(err: ValidationError) -> Self {
        CaixaError::validation(err.to_string())
    }
}

impl From<std::io::Error> for CaixaError {
    fn from(err: std::io::Error) -> Self {
        CaixaError::config(format!("I/O error: {}", err))
    }
}

impl From<toml::de::Error> for CaixaError {
    fn from(err: toml::de::Error) -> Self {
        CaixaError::config(format!("Invalid config file: {}", err))
    }
}
