//! # Domain Types
//!
//! Records kept by the glass shop back office.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │  CashRegister   │   │  CashMovement   │   │  CashClosingRecord   │  │
//! │  │  (caixa)        │◄──│  register_id    │   │  (caixa_fechamentos) │  │
//! │  │  status         │   │  kind in/out    │   │  append-only audit   │  │
//! │  │  opening_amount │   │  amount > 0     │   │  total_in/total_out  │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Product      │   │  StockMovement  │   │    FinanceEntry      │  │
//! │  │  (estoque)      │◄──│  product_id     │   │  (financas)          │  │
//! │  │  quantity       │   │  kind, reason   │   │  income / expense    │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted vs New
//! Every stored record has an `id` assigned by the store on insert. The
//! `New*` structs are the same records before insertion, without `id`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

/// Identifier assigned by the record store.
pub type RecordId = i64;

// =============================================================================
// Enumerations
// =============================================================================

/// Lifecycle status of a cash register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Open,
    Closed,
}

impl RegisterStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a movement: money (or stock) coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "entrada" => Ok(MovementKind::In),
            "out" | "saida" | "saída" => Ok(MovementKind::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["in".to_string(), "out".to_string()],
            }),
        }
    }
}

/// How a cash movement was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankTransfer,
    Check,
    Other,
}

impl PaymentMethod {
    /// Every method, in the order the register form lists them.
    pub const ALL: [PaymentMethod; 7] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Pix,
        PaymentMethod::BankTransfer,
        PaymentMethod::Check,
        PaymentMethod::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }

    /// Label shown to the operator.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "Transferência Bancária",
            PaymentMethod::Check => "Cheque",
            PaymentMethod::Other => "Outro",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    Purchase,
    Return,
    Sale,
    Loss,
    Adjustment,
}

impl StockReason {
    /// Whether this reason makes sense for the given direction.
    ///
    /// Entries come from purchases or returns, exits from sales or losses.
    /// An inventory adjustment can go either way.
    pub const fn allowed_for(&self, kind: MovementKind) -> bool {
        match (self, kind) {
            (StockReason::Adjustment, _) => true,
            (StockReason::Purchase | StockReason::Return, MovementKind::In) => true,
            (StockReason::Sale | StockReason::Loss, MovementKind::Out) => true,
            _ => false,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockReason::Purchase => "purchase",
            StockReason::Return => "return",
            StockReason::Sale => "sale",
            StockReason::Loss => "loss",
            StockReason::Adjustment => "adjustment",
        }
    }
}

impl FromStr for StockReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" => Ok(StockReason::Purchase),
            "return" => Ok(StockReason::Return),
            "sale" => Ok(StockReason::Sale),
            "loss" => Ok(StockReason::Loss),
            "adjustment" => Ok(StockReason::Adjustment),
            _ => Err(ValidationError::NotAllowed {
                field: "reason".to_string(),
                allowed: ["purchase", "return", "sale", "loss", "adjustment"]
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
            }),
        }
    }
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(EntryKind::Income),
            "expense" | "despesa" => Ok(EntryKind::Expense),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["income".to_string(), "expense".to_string()],
            }),
        }
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// One cash register opening (`caixa`).
///
/// Created open, mutated once on close, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: RecordId,
    /// Calendar date of the opening.
    pub date: NaiveDate,
    /// `HH:MM`
    pub open_time: String,
    /// `HH:MM`, absent until closed.
    pub close_time: Option<String>,
    pub opening_amount: Money,
    pub status: RegisterStatus,
    /// Cash counted at close.
    pub closing_amount: Option<Money>,
    /// opening + Σin − Σout at close.
    pub system_amount: Option<Money>,
    /// closing − system; negative means cash is missing.
    pub difference: Option<Money>,
    pub opening_notes: Option<String>,
    pub closing_notes: Option<String>,
}

impl CashRegister {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

/// A register about to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCashRegister {
    pub date: NaiveDate,
    pub open_time: String,
    pub opening_amount: Money,
    pub status: RegisterStatus,
    pub opening_notes: Option<String>,
}

/// The fields written when a register closes.
///
/// Every field is written, so the same patch with `status = Open` and the
/// rest `None` puts a register back the way it was before closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSettlement {
    pub status: RegisterStatus,
    pub close_time: Option<String>,
    pub closing_amount: Option<Money>,
    pub system_amount: Option<Money>,
    pub difference: Option<Money>,
    pub closing_notes: Option<String>,
}

impl RegisterSettlement {
    /// Patch that undoes a settlement.
    pub fn reopen() -> Self {
        RegisterSettlement {
            status: RegisterStatus::Open,
            close_time: None,
            closing_amount: None,
            system_amount: None,
            difference: None,
            closing_notes: None,
        }
    }
}

// =============================================================================
// Cash Movement
// =============================================================================

/// An entry or exit recorded against an open register (`caixa_movimentacoes`).
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: RecordId,
    pub register_id: RecordId,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub kind: MovementKind,
    /// Strictly positive.
    pub amount: Money,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl CashMovement {
    /// Amount with sign applied: positive for entries, negative for exits.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            MovementKind::In => self.amount,
            MovementKind::Out => -self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCashMovement {
    pub register_id: RecordId,
    pub date: NaiveDate,
    pub time: String,
    pub kind: MovementKind,
    pub amount: Money,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

// =============================================================================
// Cash Closing Record
// =============================================================================

/// Historical summary appended when a register closes (`caixa_fechamentos`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashClosingRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub open_time: String,
    pub close_time: String,
    pub opening_amount: Money,
    pub closing_amount: Money,
    pub system_amount: Money,
    pub difference: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCashClosingRecord {
    pub date: NaiveDate,
    pub open_time: String,
    pub close_time: String,
    pub opening_amount: Money,
    pub closing_amount: Money,
    pub system_amount: Money,
    pub difference: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub notes: Option<String>,
}

// =============================================================================
// Inventory
// =============================================================================

/// A stocked item (`estoque`): glass sheets, aluminium profiles, hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    /// Shop code, e.g. `V123`.
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    /// At or below this quantity the product shows up in stock alerts.
    pub minimum_quantity: i64,
    /// `chapa`, `barra`, `unidade`...
    pub unit: String,
    pub unit_price: Money,
    pub supplier: Option<String>,
    pub location: Option<String>,
    /// Date of the last stock entry.
    pub last_entry: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub minimum_quantity: i64,
    pub unit: String,
    pub unit_price: Money,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub last_entry: Option<NaiveDate>,
}

/// Quantity change written back to a product after a stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub quantity: i64,
    pub last_entry: Option<NaiveDate>,
}

/// A stock entry or exit (`estoque_movimentacoes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: RecordId,
    pub product_id: RecordId,
    /// Product name at the time of the movement (frozen).
    pub product_name: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub date: NaiveDate,
    pub reason: StockReason,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStockMovement {
    pub product_id: RecordId,
    pub product_name: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub date: NaiveDate,
    pub reason: StockReason,
    pub notes: Option<String>,
}

// =============================================================================
// Finance
// =============================================================================

/// A ledger entry (`financas`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFinanceEntry {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_round_trips_through_str() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::Cash.label(), "Dinheiro");
        assert_eq!(PaymentMethod::BankTransfer.label(), "Transferência Bancária");
    }

    #[test]
    fn test_movement_kind_accepts_portuguese() {
        assert_eq!("entrada".parse::<MovementKind>().unwrap(), MovementKind::In);
        assert_eq!("saida".parse::<MovementKind>().unwrap(), MovementKind::Out);
        assert_eq!("OUT".parse::<MovementKind>().unwrap(), MovementKind::Out);
        assert!("sideways".parse::<MovementKind>().is_err());
    }

    #[test]
    fn test_entry_kind_parsing() {
        assert_eq!("receita".parse::<EntryKind>().unwrap(), EntryKind::Income);
        assert_eq!("EXPENSE".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert!("transfer".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_stock_reason_direction() {
        assert!(StockReason::Purchase.allowed_for(MovementKind::In));
        assert!(!StockReason::Purchase.allowed_for(MovementKind::Out));
        assert!(StockReason::Loss.allowed_for(MovementKind::Out));
        assert!(StockReason::Adjustment.allowed_for(MovementKind::In));
        assert!(StockReason::Adjustment.allowed_for(MovementKind::Out));
    }

    #[test]
    fn test_signed_amount() {
        let mut movement = CashMovement {
            id: 1,
            register_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            time: "09:00".to_string(),
            kind: MovementKind::In,
            amount: Money::from_cents(15000),
            description: "Recebimento à vista".to_string(),
            payment_method: PaymentMethod::Cash,
            notes: None,
        };
        assert_eq!(movement.signed_amount().cents(), 15000);

        movement.kind = MovementKind::Out;
        assert_eq!(movement.signed_amount().cents(), -15000);
    }

    #[test]
    fn test_register_serializes_with_snake_case_status() {
        let register = CashRegister {
            id: 1,
            date: NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            open_time: "08:30".to_string(),
            close_time: None,
            opening_amount: Money::from_cents(20000),
            status: RegisterStatus::Open,
            closing_amount: None,
            system_amount: None,
            difference: None,
            opening_notes: Some("Início do expediente".to_string()),
            closing_notes: None,
        };

        let json = serde_json::to_value(&register).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["date"], "2025-06-05");
        assert_eq!(json["opening_amount"], 20000);
        assert!(json["closing_amount"].is_null());
    }
}
