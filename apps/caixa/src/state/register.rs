//! # Register State
//!
//! The in-memory side of the cash register lifecycle: which register is
//! open and the movements recorded against it.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register State Machine                               │
//! │                                                                         │
//! │                      open()                                             │
//! │  ┌────────────────┐ ───────────────────► ┌──────────────────────────┐  │
//! │  │ NoOpenRegister │                      │ Open { register,         │  │
//! │  └────────────────┘ ◄─────────────────── │        movements }       │  │
//! │                      close()             └──────────────────────────┘  │
//! │                                               │            ▲           │
//! │                                               └────────────┘           │
//! │                                            register_movement()         │
//! │                                                                         │
//! │  Every transition happens only after the store confirmed the write.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use vidracaria_core::register::{movement_totals, running_balance, sort_movements, MovementTotals};
use vidracaria_core::{CashMovement, CashRegister, CoreError, CoreResult, Money};

/// Register state held by [`CashRegisterLifecycle`](crate::commands::caixa::CashRegisterLifecycle).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegisterState {
    #[default]
    NoOpenRegister,
    Open {
        register: CashRegister,
        /// In the order they were recorded.
        movements: Vec<CashMovement>,
    },
}

impl RegisterState {
    /// Builds the open state from a stored register.
    ///
    /// Movements belonging to other registers are rejected.
    pub fn opened(register: CashRegister, movements: Vec<CashMovement>) -> CoreResult<Self> {
        if !register.is_open() {
            return Err(CoreError::InvalidRegisterStatus {
                register_id: register.id,
                status: register.status,
            });
        }
        if let Some(stray) = movements.iter().find(|m| m.register_id != register.id) {
            return Err(CoreError::invalid_state(format!(
                "Movement {} belongs to register {}, not {}",
                stray.id, stray.register_id, register.id
            )));
        }
        Ok(RegisterState::Open {
            register,
            movements,
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, RegisterState::Open { .. })
    }

    pub fn register(&self) -> Option<&CashRegister> {
        match self {
            RegisterState::Open { register, .. } => Some(register),
            RegisterState::NoOpenRegister => None,
        }
    }

    /// The open register and its movements, or `InvalidState`.
    pub fn require_open(&self) -> CoreResult<(&CashRegister, &[CashMovement])> {
        match self {
            RegisterState::Open {
                register,
                movements,
            } => Ok((register, movements)),
            RegisterState::NoOpenRegister => {
                Err(CoreError::invalid_state("No cash register is open"))
            }
        }
    }

    /// Fails when a register is already open.
    pub fn require_closed(&self) -> CoreResult<()> {
        match self {
            RegisterState::Open { register, .. } => Err(CoreError::invalid_state(format!(
                "Cash register {} opened on {} is still open",
                register.id, register.date
            ))),
            RegisterState::NoOpenRegister => Ok(()),
        }
    }

    /// Movements ordered by time of day; equal times keep recording order.
    pub fn sorted_movements(&self) -> Vec<CashMovement> {
        match self {
            RegisterState::Open { movements, .. } => {
                let mut sorted = movements.clone();
                sort_movements(&mut sorted);
                sorted
            }
            RegisterState::NoOpenRegister => Vec::new(),
        }
    }

    /// opening + Σin − Σout, zero when nothing is open.
    pub fn balance(&self) -> Money {
        match self {
            RegisterState::Open {
                register,
                movements,
            } => running_balance(register.opening_amount, movements),
            RegisterState::NoOpenRegister => Money::zero(),
        }
    }

    pub fn totals(&self) -> MovementTotals {
        match self {
            RegisterState::Open { movements, .. } => movement_totals(movements),
            RegisterState::NoOpenRegister => movement_totals(&[]),
        }
    }

    pub(crate) fn push_movement(&mut self, movement: CashMovement) -> CoreResult<()> {
        match self {
            RegisterState::Open {
                register,
                movements,
            } if register.id == movement.register_id => {
                movements.push(movement);
                Ok(())
            }
            RegisterState::Open { register, .. } => Err(CoreError::invalid_state(format!(
                "Movement {} belongs to register {}, not {}",
                movement.id, movement.register_id, register.id
            ))),
            RegisterState::NoOpenRegister => {
                Err(CoreError::invalid_state("No cash register is open"))
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = RegisterState::NoOpenRegister;
    }
}
