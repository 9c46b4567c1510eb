//! # Work Orders
//!
//! Status board for work orders (ordens de serviço). An order moves one
//! column at a time, left or right:
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌────────────────────┐    ┌───────────┐
//! │   open   │ ◄─►│ in_production │ ◄─►│ ready_for_delivery │ ◄─►│ delivered │
//! └──────────┘    └───────────────┘    └────────────────────┘    └───────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::RecordId;
use crate::validation::{validate_notes, validate_order_amount, validate_required_text, ValidationResult};
use crate::MAX_DESCRIPTION_LENGTH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Open,
    InProduction,
    ReadyForDelivery,
    Delivered,
}

impl WorkOrderStatus {
    /// Board columns, left to right.
    pub const ALL: [WorkOrderStatus; 4] = [
        WorkOrderStatus::Open,
        WorkOrderStatus::InProduction,
        WorkOrderStatus::ReadyForDelivery,
        WorkOrderStatus::Delivered,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "open",
            WorkOrderStatus::InProduction => "in_production",
            WorkOrderStatus::ReadyForDelivery => "ready_for_delivery",
            WorkOrderStatus::Delivered => "delivered",
        }
    }

    /// Column to the right, `None` once delivered.
    pub const fn next(&self) -> Option<WorkOrderStatus> {
        match self {
            WorkOrderStatus::Open => Some(WorkOrderStatus::InProduction),
            WorkOrderStatus::InProduction => Some(WorkOrderStatus::ReadyForDelivery),
            WorkOrderStatus::ReadyForDelivery => Some(WorkOrderStatus::Delivered),
            WorkOrderStatus::Delivered => None,
        }
    }

    /// Column to the left, `None` while still open.
    pub const fn previous(&self) -> Option<WorkOrderStatus> {
        match self {
            WorkOrderStatus::Open => None,
            WorkOrderStatus::InProduction => Some(WorkOrderStatus::Open),
            WorkOrderStatus::ReadyForDelivery => Some(WorkOrderStatus::InProduction),
            WorkOrderStatus::Delivered => Some(WorkOrderStatus::ReadyForDelivery),
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "em_aberto" => Ok(WorkOrderStatus::Open),
            "in_production" | "em_producao" | "em_produção" => Ok(WorkOrderStatus::InProduction),
            "ready_for_delivery" | "pronto_entrega" => Ok(WorkOrderStatus::ReadyForDelivery),
            "delivered" | "entregue" => Ok(WorkOrderStatus::Delivered),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: WorkOrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: RecordId,
    pub customer: String,
    pub phone: Option<String>,
    /// What is being made, e.g. `Box de vidro 8mm`.
    pub product: String,
    pub entry_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub status: WorkOrderStatus,
    pub amount: Money,
    pub notes: Option<String>,
}

impl WorkOrder {
    /// Validated order, starting in the open column.
    pub fn new(
        id: RecordId,
        customer: &str,
        product: &str,
        entry_date: NaiveDate,
        amount: Money,
    ) -> ValidationResult<Self> {
        let customer = validate_required_text("customer", customer, MAX_DESCRIPTION_LENGTH)?;
        let product = validate_required_text("product", product, MAX_DESCRIPTION_LENGTH)?;
        validate_order_amount(amount)?;

        Ok(WorkOrder {
            id,
            customer,
            phone: None,
            product,
            entry_date,
            delivery_date: None,
            status: WorkOrderStatus::Open,
            amount,
            notes: None,
        })
    }

    pub fn with_delivery_date(mut self, date: NaiveDate) -> ValidationResult<Self> {
        if date < self.entry_date {
            return Err(ValidationError::InvalidFormat {
                field: "delivery_date".to_string(),
                reason: "must not be before the entry date".to_string(),
            });
        }
        self.delivery_date = Some(date);
        Ok(self)
    }

    pub fn with_notes(mut self, notes: Option<&str>) -> ValidationResult<Self> {
        self.notes = validate_notes(notes)?;
        Ok(self)
    }

    /// Moves one column right. Returns `false` when already delivered.
    pub fn advance(&mut self) -> bool {
        match self.status.next() {
            Some(next) => {
                self.status = next;
                true
            }
            None => false,
        }
    }

    /// Moves one column left. Returns `false` when still open.
    pub fn step_back(&mut self) -> bool {
        match self.status.previous() {
            Some(previous) => {
                self.status = previous;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub status: WorkOrderStatus,
    pub orders: Vec<WorkOrder>,
    pub total: Money,
}

/// One column per status, in [`WorkOrderStatus::ALL`] order, empty columns
/// included. Orders keep their input order within a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderBoard {
    pub columns: Vec<BoardColumn>,
}

impl WorkOrderBoard {
    pub fn column(&self, status: WorkOrderStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// Orders not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.status != WorkOrderStatus::Delivered)
            .map(|c| c.orders.len())
            .sum()
    }
}

pub fn group_by_status<I>(orders: I) -> WorkOrderBoard
where
    I: IntoIterator<Item = WorkOrder>,
{
    let mut columns: Vec<BoardColumn> = WorkOrderStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            orders: Vec::new(),
            total: Money::zero(),
        })
        .collect();

    for order in orders {
        if let Some(column) = columns.iter_mut().find(|c| c.status == order.status) {
            column.total += order.amount;
            column.orders.push(order);
        }
    }

    WorkOrderBoard { columns }
}
