//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A register that adds 0.10 + 0.20 in floating point holds              │
//! │  0.30000000000000004, and the closing difference is never zero.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    R$ 150,00 + R$ 350,00 - R$ 50,00 = 45000 centavos, exactly          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vidracaria_core::money::Money;
//!
//! let opening = Money::from_cents(20000); // R$ 200,00
//! let sale: Money = "150,00".parse().unwrap();
//!
//! assert_eq!((opening + sale).cents(), 35000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (1/100 of a real).
///
/// ## Design Decisions
/// - **i64 (signed)**: a closing difference is negative when cash is missing
/// - **Single field tuple struct**: serializes as a bare integer, so the
///   store columns are plain INTEGER centavos
/// - **Saturating operators**: `+`, `-`, `*` clamp at the i64 bounds and
///   never panic; use `checked_add`/`checked_sub` to detect overflow
///
/// ## Where Money is Used
/// ```text
/// opening_amount ──┐
///                  ├──► system_amount = opening + Σin − Σout
/// movements ───────┘          │
///                             ▼
/// closing_amount ──────► difference = closing − system
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use vidracaria_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// For negative amounts only the major unit is negative:
    /// `from_major_minor(-5, 50)` is -R$ 5,50.
    ///
    /// ```rust
    /// use vidracaria_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion (truncated toward zero).
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity (stock valuation).
    ///
    /// ```rust
    /// use vidracaria_core::money::Money;
    ///
    /// let sheet = Money::from_cents(25000); // R$ 250,00 per sheet
    /// assert_eq!(sheet.multiply_quantity(10).cents(), 250000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the sum does not fit in i64 centavos.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` when the difference does not fit in i64 centavos.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Parses a decimal amount typed into a form.
    ///
    /// ## Accepted Input
    /// - `"150"`, `"150.5"`, `"150.50"`, `"150,50"` (comma or dot decimal)
    /// - optional leading `-` and surrounding whitespace
    /// - at most two decimal places
    ///
    /// Thousands separators are rejected: `"1.234,56"` is ambiguous.
    ///
    /// ```rust
    /// use vidracaria_core::money::Money;
    ///
    /// assert_eq!(Money::parse("150,5").unwrap().cents(), 15050);
    /// assert_eq!(Money::parse("-50").unwrap().cents(), -5000);
    /// assert!(Money::parse("12.345").is_err());
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut parts = digits.splitn(2, |c| c == '.' || c == ',');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a decimal number such as 150,00"));
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must have at most two decimal places"));
        }

        let reais: i64 = whole
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let centavos: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or_default() * 10,
            _ => fraction.parse::<i64>().unwrap_or_default(),
        };

        let cents = reais
            .checked_mul(100)
            .and_then(|c| c.checked_add(centavos))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

/// Display in Brazilian format: `R$ 1.234,56`, `-R$ 50,00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = self.reais().abs().to_string();

        // Group the reais in thousands with '.'
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(
            f,
            "{}{} {},{:02}",
            sign,
            crate::CURRENCY_SYMBOL,
            grouped,
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by i64 (stock quantity × unit price).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10,99");
        assert_eq!(Money::from_cents(500).to_string(), "R$ 5,00");
        assert_eq!(Money::from_cents(-5000).to_string(), "-R$ 50,00");
        assert_eq!(Money::from_cents(0).to_string(), "R$ 0,00");
        assert_eq!(Money::from_cents(123456).to_string(), "R$ 1.234,56");
        assert_eq!(Money::from_cents(123456789).to_string(), "R$ 1.234.567,89");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_overflow_saturates_or_is_reported() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
        assert_eq!(max.multiply_quantity(2).cents(), i64::MAX);

        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(100).checked_sub(Money::from_cents(30)),
            Some(Money::from_cents(70))
        );
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(15000),
            Money::from_cents(35000),
            Money::from_cents(-5000),
        ];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 45000);
        assert_eq!(by_value, by_ref);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::from_cents(-100).abs().cents(), 100);
    }

    #[test]
    fn test_parse_accepts_form_input() {
        assert_eq!(Money::parse("150").unwrap().cents(), 15000);
        assert_eq!(Money::parse("150.5").unwrap().cents(), 15050);
        assert_eq!(Money::parse("150,50").unwrap().cents(), 15050);
        assert_eq!(Money::parse(" 0,01 ").unwrap().cents(), 1);
        assert_eq!(Money::parse("-50").unwrap().cents(), -5000);
        assert_eq!(Money::parse("200.").unwrap().cents(), 20000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Money::parse(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.234,56").is_err());
        assert!(Money::parse("10.999").is_err());
        assert!(Money::parse(",50").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_cents(650)).unwrap();
        assert_eq!(json, "650");
        let back: Money = serde_json::from_str("650").unwrap();
        assert_eq!(back.cents(), 650);
    }
}
