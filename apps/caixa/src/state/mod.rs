//! # State Module
//!
//! Focused state types instead of one `AppState`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────┐  ┌──────────┐  │
//! │  │ ConfigState  │  │  StoreState    │  │RegisterState │  │  Clock   │  │
//! │  │              │  │                │  │              │  │          │  │
//! │  │ toml + env   │  │ SQLite | Demo  │  │ open/closed  │  │ today,   │  │
//! │  │ timeout      │  │ (RecordStore)  │  │ + movements  │  │ HH:MM    │  │
//! │  └──────────────┘  └────────────────┘  └──────────────┘  └──────────┘  │
//! │                                                                         │
//! │  ConfigState: read-only after load                                     │
//! │  StoreState:  shared behind Arc, internally synchronized               │
//! │  RegisterState: owned by one lifecycle, mutated through &mut self      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod clock;
mod config;
mod register;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BusinessSettings, ConfigState, DatabaseSettings, StoreSettings};
pub use register::RegisterState;
pub use store::StoreState;
