//! # Validation Module
//!
//! Input validation for register, stock and ledger operations.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Types: dates, enums                                               │
//! │  └── Money::parse for decimal amounts                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Ranges (amount > 0, opening >= 0)                                 │
//! │  └── Required text, max lengths, HH:MM times                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vidracaria_core::validation::{validate_movement_amount, validate_time_of_day};
//! use vidracaria_core::Money;
//!
//! validate_time_of_day("08:30").unwrap();
//! assert!(validate_movement_amount(Money::zero()).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT, MAX_CODE_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_NOTES_LENGTH, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a time of day in `HH:MM` form (24 hours).
///
/// ## Example
/// ```rust
/// use vidracaria_core::validation::validate_time_of_day;
///
/// assert!(validate_time_of_day("08:30").is_ok());
/// assert!(validate_time_of_day("23:59").is_ok());
/// assert!(validate_time_of_day("8:30").is_err());
/// assert!(validate_time_of_day("24:00").is_err());
/// ```
pub fn validate_time_of_day(time: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "time".to_string(),
        reason: reason.to_string(),
    };

    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid("expected HH:MM"));
    }

    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid("expected HH:MM"));
    }

    let hours = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minutes = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    if hours > 23 || minutes > 59 {
        return Err(invalid("hour must be 00-23 and minute 00-59"));
    }

    Ok(())
}

/// Validates required free text such as a movement description.
///
/// Returns the trimmed text.
pub fn validate_required_text(field: &str, text: &str, max: usize) -> ValidationResult<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if text.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(text.to_string())
}

/// Validates a description (required, at most [`MAX_DESCRIPTION_LENGTH`]).
pub fn validate_description(description: &str) -> ValidationResult<String> {
    validate_required_text("description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validates optional notes.
///
/// Blank notes collapse to `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(Some(notes.to_string()))
}

/// Validates a product code such as `V123` or `A-45`.
pub fn validate_product_code(code: &str) -> ValidationResult<String> {
    let code = validate_required_text("code", code, MAX_CODE_LENGTH)?;

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Opening amount declared when a register opens. Zero is allowed.
pub fn validate_opening_amount(amount: Money) -> ValidationResult<()> {
    validate_not_negative("opening_amount", amount)?;
    validate_at_most_max("opening_amount", amount)
}

/// Cash counted when a register closes. Zero is allowed.
pub fn validate_closing_amount(amount: Money) -> ValidationResult<()> {
    validate_not_negative("closing_amount", amount)?;
    validate_at_most_max("closing_amount", amount)
}

/// Amount of a cash movement or ledger entry. Must be strictly positive and
/// at most [`MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use vidracaria_core::validation::validate_movement_amount;
/// use vidracaria_core::Money;
///
/// assert!(validate_movement_amount(Money::from_cents(1)).is_ok());
/// assert!(validate_movement_amount(Money::zero()).is_err());
/// assert!(validate_movement_amount(Money::from_cents(-500)).is_err());
/// ```
pub fn validate_movement_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    validate_at_most_max("amount", amount)
}

/// Unit price of a product.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    validate_not_negative("unit_price", price)?;
    validate_at_most_max("unit_price", price)
}

/// Amount charged for a work order. Zero is allowed.
pub fn validate_order_amount(amount: Money) -> ValidationResult<()> {
    validate_not_negative("amount", amount)?;
    validate_at_most_max("amount", amount)
}

fn validate_at_most_max(field: &str, amount: Money) -> ValidationResult<()> {
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT.to_string(),
        });
    }
    Ok(())
}

fn validate_not_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Quantity Validators
// =============================================================================

/// Quantity moved in a stock movement, or ordered on a quote line.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    validate_quantity_at_most_max("quantity", quantity)
}

/// Stock level or minimum stock level of a product.
pub fn validate_stock_level(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_quantity_at_most_max(field, quantity)
}

fn validate_quantity_at_most_max(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity > MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_QUANTITY.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
