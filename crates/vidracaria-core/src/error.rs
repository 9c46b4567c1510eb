//! # Error Types
//!
//! Domain-specific error types for vidracaria-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vidracaria-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vidracaria-db errors (separate crate)                                 │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  caixa app errors                                                      │
//! │  └── CaixaError       - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴──► CaixaError → terminal         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::RegisterStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation was attempted from the wrong lifecycle state.
    ///
    /// ## When This Occurs
    /// - Opening a register while another one is open
    /// - Recording a movement with no open register
    /// - Closing twice
    #[error("{0}")]
    InvalidState(String),

    /// A stored register has a status that does not allow the operation.
    #[error("Cash register {register_id} is {status}, cannot perform operation")]
    InvalidRegisterStatus {
        register_id: i64,
        status: RegisterStatus,
    },

    /// Not enough stock to register an exit.
    ///
    /// ## User Workflow
    /// ```text
    /// Stock exit (qty: 5) for V456
    ///      │
    ///      ▼
    /// available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { code: "V456", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidState error with a human-readable message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidState(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must be greater than or equal to zero")]
    MustNotBeNegative { field: String },

    /// Value exceeds the accepted maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (e.g., invalid time, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
