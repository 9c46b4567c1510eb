//! # Register Reconciliation
//!
//! Pure arithmetic over a register's movements: running balance, totals per
//! direction and payment method, and the figures written at close.
//!
//! ## Close Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  opening_amount ──┐                                                     │
//! │                   ├──► system = opening + Σin − Σout                    │
//! │  movements ───────┘              │                                      │
//! │                                  ▼                                      │
//! │  closing_amount ─────────► difference = closing − system                │
//! │                                  │                                      │
//! │                                  ├──► RegisterSettlement (caixa row)    │
//! │                                  └──► NewCashClosingRecord (history)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A negative difference is a shortfall, a positive one a surplus.

use serde::Serialize;

use crate::money::Money;
use crate::types::{
    CashClosingRecord, CashMovement, CashRegister, MovementKind, NewCashClosingRecord,
    PaymentMethod, RegisterSettlement, RegisterStatus,
};

// =============================================================================
// Totals
// =============================================================================

/// Sums of a register's movements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MovementTotals {
    pub total_in: Money,
    pub total_out: Money,
    /// Entries and exits per payment method, kept apart, only for methods
    /// that appear, in [`PaymentMethod::ALL`] order.
    pub by_method: Vec<MethodTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total_in: Money,
    pub total_out: Money,
}

impl MovementTotals {
    /// Σin − Σout
    #[inline]
    pub fn net(&self) -> Money {
        self.total_in - self.total_out
    }
}

/// Sums movements per direction and per payment method.
pub fn movement_totals(movements: &[CashMovement]) -> MovementTotals {
    let mut totals = MovementTotals::default();

    for method in PaymentMethod::ALL {
        let mut entry = MethodTotal {
            method,
            total_in: Money::zero(),
            total_out: Money::zero(),
        };
        let mut seen = false;

        for movement in movements.iter().filter(|m| m.payment_method == method) {
            seen = true;
            match movement.kind {
                MovementKind::In => entry.total_in += movement.amount,
                MovementKind::Out => entry.total_out += movement.amount,
            }
        }

        if seen {
            totals.total_in += entry.total_in;
            totals.total_out += entry.total_out;
            totals.by_method.push(entry);
        }
    }

    totals
}

/// `opening + Σin − Σout`
///
/// ## Example
/// ```rust
/// use vidracaria_core::register::running_balance;
/// use vidracaria_core::Money;
///
/// assert_eq!(running_balance(Money::from_cents(20000), &[]).cents(), 20000);
/// ```
pub fn running_balance(opening_amount: Money, movements: &[CashMovement]) -> Money {
    opening_amount + movements.iter().map(CashMovement::signed_amount).sum::<Money>()
}

// =============================================================================
// Reconciliation
// =============================================================================

/// The figures computed when a register closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub opening_amount: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub system_amount: Money,
    pub closing_amount: Money,
    pub difference: Money,
}

impl Reconciliation {
    /// Reconciles a register's movements against the counted cash.
    pub fn compute(
        opening_amount: Money,
        movements: &[CashMovement],
        closing_amount: Money,
    ) -> Self {
        let totals = movement_totals(movements);
        let system_amount = opening_amount + totals.total_in - totals.total_out;

        Reconciliation {
            opening_amount,
            total_in: totals.total_in,
            total_out: totals.total_out,
            system_amount,
            closing_amount,
            difference: closing_amount - system_amount,
        }
    }

    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }

    /// Fields written to the register row on close.
    pub fn settlement(&self, close_time: &str, notes: Option<String>) -> RegisterSettlement {
        RegisterSettlement {
            status: RegisterStatus::Closed,
            close_time: Some(close_time.to_string()),
            closing_amount: Some(self.closing_amount),
            system_amount: Some(self.system_amount),
            difference: Some(self.difference),
            closing_notes: notes,
        }
    }

    /// History row appended on close.
    pub fn closing_record(
        &self,
        register: &CashRegister,
        close_time: &str,
        notes: Option<String>,
    ) -> NewCashClosingRecord {
        NewCashClosingRecord {
            date: register.date,
            open_time: register.open_time.clone(),
            close_time: close_time.to_string(),
            opening_amount: self.opening_amount,
            closing_amount: self.closing_amount,
            system_amount: self.system_amount,
            difference: self.difference,
            total_in: self.total_in,
            total_out: self.total_out,
            notes,
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Orders movements by time of day, earliest first. Equal times keep their
/// insertion order.
pub fn sort_movements(movements: &mut [CashMovement]) {
    movements.sort_by(|a, b| a.time.cmp(&b.time));
}

/// Orders closing records by date, most recent first.
pub fn sort_closing_history(records: &mut [CashClosingRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

// =============================================================================
// Unit Tests
// =============================================================================
