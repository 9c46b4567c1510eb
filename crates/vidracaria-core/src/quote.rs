//! # Quotes
//!
//! Line and quote totals for a customer quote (orçamento).
//!
//! ```text
//! Vidro temperado 8mm   2 × R$ 250,00 = R$ 500,00
//! Instalação            1 × R$ 150,00 = R$ 150,00
//!                                       ──────────
//!                              total    R$ 650,00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_description, validate_quantity, validate_unit_price, ValidationResult,
};

/// Where a quote stands with the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Ok(QuoteStatus::Pending),
            "approved" | "aprovado" => Ok(QuoteStatus::Approved),
            "rejected" | "recusado" => Ok(QuoteStatus::Rejected),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "approved".to_string(),
                    "rejected".to_string(),
                ],
            }),
        }
    }
}

/// One quoted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl QuoteLine {
    /// Validated line: required description, `1..=MAX_QUANTITY` units and a
    /// unit price between zero and `MAX_AMOUNT`.
    pub fn new(description: &str, quantity: i64, unit_price: Money) -> ValidationResult<Self> {
        let description = validate_description(description)?;
        validate_quantity(quantity)?;
        validate_unit_price(unit_price)?;

        Ok(QuoteLine {
            description,
            quantity,
            unit_price,
        })
    }

    /// quantity × unit price
    #[inline]
    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Parses `description;quantity;unit price`, e.g.
/// `Vidro temperado 8mm;2;250,00`.
impl FromStr for QuoteLine {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "item".to_string(),
            reason: "expected description;quantity;unit price".to_string(),
        };

        let mut parts = s.split(';');
        let (Some(description), Some(quantity), Some(price), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let quantity: i64 = quantity.trim().parse().map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number".to_string(),
        })?;

        QuoteLine::new(description, quantity, Money::parse(price)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineTotal {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteTotals {
    pub lines: Vec<LineTotal>,
    pub total: Money,
}

/// Totals a quote. A quote needs at least one line.
pub fn quote_totals(lines: &[QuoteLine]) -> ValidationResult<QuoteTotals> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    let lines: Vec<LineTotal> = lines
        .iter()
        .map(|line| LineTotal {
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: line.total(),
        })
        .collect();
    let total = lines.iter().map(|l| l.total).sum();

    Ok(QuoteTotals { lines, total })
}
