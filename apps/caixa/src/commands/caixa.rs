//! # Cash Register Commands
//!
//! The register lifecycle: open one register, record movements against it,
//! reconcile on close.
//!
//! ## Close Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         close(650,00)                                   │
//! │                                                                         │
//! │  1. Reconciliation::compute(opening, movements, closing)               │
//! │        system = 200 + 500 − 50 = 650, difference = 0                   │
//! │                                                                         │
//! │  2. update caixa #id  ──── status = closed, close_time, amounts        │
//! │        │ fails → PersistenceFailure, state stays Open                  │
//! │        ▼                                                                │
//! │  3. insert caixa_fechamentos                                           │
//! │        │ fails → update caixa #id back to open, PersistenceFailure     │
//! │        ▼                                                                │
//! │  4. RegisterState → NoOpenRegister                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use vidracaria_core::register::{sort_closing_history, MovementTotals, Reconciliation};
use vidracaria_core::validation::{
    validate_closing_amount, validate_description, validate_movement_amount, validate_notes,
    validate_opening_amount, validate_time_of_day,
};
use vidracaria_core::{
    CashClosingRecord, CashMovement, CashRegister, Money, MovementKind, NewCashMovement,
    NewCashRegister, PaymentMethod, RegisterSettlement, RegisterStatus,
};
use vidracaria_db::store::{FetchOptions, FilterOp, OrderDirection, RecordStore};

use super::bounded;
use crate::error::{CaixaError, CaixaResult};
use crate::state::{Clock, RegisterState, SystemClock};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// A movement as entered at the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub amount: Money,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Everything written by a successful close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseSummary {
    pub register: CashRegister,
    pub closing: CashClosingRecord,
    pub reconciliation: Reconciliation,
}

/// Snapshot for the status screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterOverview {
    pub open: bool,
    pub register: Option<CashRegister>,
    pub balance: Money,
    pub totals: MovementTotals,
    pub movements: Vec<CashMovement>,
}

/// Cash register lifecycle over a record store.
///
/// ## Invariants
/// - At most one register is open, checked in memory and in the store
/// - The in-memory state changes only after the store confirmed the write
/// - Every store call is bounded by `store_timeout`
pub struct CashRegisterLifecycle<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
    state: RegisterState,
    store_timeout: Duration,
}

impl<S: RecordStore, C: Clock> CashRegisterLifecycle<S, C> {
    pub fn new(store: Arc<S>, clock: C) -> Self {
        CashRegisterLifecycle {
            store,
            clock,
            state: RegisterState::NoOpenRegister,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn state(&self) -> &RegisterState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn register(&self) -> Option<&CashRegister> {
        self.state.register()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Rebuilds the state from the store: the open register and its
    /// movements, or no register.
    ///
    /// With several open registers the most recent one (date, then opening
    /// time) wins and a warning is logged.
    pub async fn load(&mut self) -> CaixaResult<Option<CashRegister>> {
        let open: Vec<CashRegister> = bounded(
            self.store_timeout,
            "fetch open caixa",
            self.store
                .fetch_all(&FetchOptions::new().filter("status", FilterOp::Eq, "open")),
        )
        .await?;

        if open.len() > 1 {
            warn!(
                count = open.len(),
                ids = ?open.iter().map(|r| r.id).collect::<Vec<_>>(),
                "More than one open cash register, using the most recent"
            );
        }

        let Some(register) = open
            .into_iter()
            .max_by(|a, b| (a.date, &a.open_time, a.id).cmp(&(b.date, &b.open_time, b.id)))
        else {
            debug!("No open cash register");
            self.state.clear();
            return Ok(None);
        };

        let movements: Vec<CashMovement> = bounded(
            self.store_timeout,
            "fetch caixa_movimentacoes",
            self.store.fetch_all(&FetchOptions::new().filter(
                "register_id",
                FilterOp::Eq,
                register.id,
            )),
        )
        .await?;

        info!(
            register_id = register.id,
            date = %register.date,
            movements = movements.len(),
            "Open cash register loaded"
        );

        self.state = RegisterState::opened(register.clone(), movements)?;
        Ok(Some(register))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Opens a register.
    ///
    /// ## Errors
    /// - `InvalidState` if a register is open here or in the store
    /// - `ValidationError` for a negative amount or a malformed time
    /// - `PersistenceFailure` if the store fails or times out
    pub async fn open(
        &mut self,
        date: NaiveDate,
        time: &str,
        opening_amount: Money,
        notes: Option<&str>,
    ) -> CaixaResult<CashRegister> {
        self.state.require_closed()?;

        validate_opening_amount(opening_amount)?;
        validate_time_of_day(time)?;
        let notes = validate_notes(notes)?;

        let persisted: Vec<CashRegister> = bounded(
            self.store_timeout,
            "fetch open caixa",
            self.store.fetch_all(
                &FetchOptions::new()
                    .filter("status", FilterOp::Eq, RegisterStatus::Open.as_str())
                    .limit(1),
            ),
        )
        .await?;
        if let Some(existing) = persisted.first() {
            return Err(CaixaError::invalid_state(format!(
                "Cash register {} opened on {} is still open",
                existing.id, existing.date
            )));
        }

        let new = NewCashRegister {
            date,
            open_time: time.to_string(),
            opening_amount,
            status: RegisterStatus::Open,
            opening_notes: notes,
        };

        let register = bounded(
            self.store_timeout,
            "insert caixa",
            self.store.insert::<CashRegister>(&new),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CaixaError::persistence("Store returned no record for caixa"))?;

        info!(
            register_id = register.id,
            date = %register.date,
            opening_amount = %register.opening_amount,
            "Cash register opened"
        );

        self.state = RegisterState::opened(register.clone(), Vec::new())?;
        Ok(register)
    }

    /// Records a movement against the open register, stamped with the
    /// register's date and the clock's time of day.
    pub async fn register_movement(
        &mut self,
        request: MovementRequest,
    ) -> CaixaResult<CashMovement> {
        let (register, _) = self.state.require_open()?;

        validate_movement_amount(request.amount)?;
        let description = validate_description(&request.description)?;
        let notes = validate_notes(request.notes.as_deref())?;

        let new = NewCashMovement {
            register_id: register.id,
            date: register.date,
            time: self.clock.time_of_day(),
            kind: request.kind,
            amount: request.amount,
            description,
            payment_method: request.payment_method,
            notes,
        };

        let movement = bounded(
            self.store_timeout,
            "insert caixa_movimentacoes",
            self.store.insert::<CashMovement>(&new),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CaixaError::persistence("Store returned no record for movement"))?;

        self.state.push_movement(movement.clone())?;

        info!(
            register_id = movement.register_id,
            movement_id = movement.id,
            kind = %movement.kind,
            amount = %movement.amount,
            balance = %self.state.balance(),
            "Cash movement recorded"
        );
        Ok(movement)
    }

    /// Closes the open register and appends its closing record.
    pub async fn close(
        &mut self,
        closing_amount: Money,
        notes: Option<&str>,
    ) -> CaixaResult<CloseSummary> {
        let (register, movements) = self.state.require_open()?;

        validate_closing_amount(closing_amount)?;
        let notes = validate_notes(notes)?;

        let reconciliation = Reconciliation::compute(register.opening_amount, movements, closing_amount);
        let close_time = self.clock.time_of_day();
        let settlement = reconciliation.settlement(&close_time, notes.clone());
        let record = reconciliation.closing_record(register, &close_time, notes);
        let register_id = register.id;

        let closed = bounded(
            self.store_timeout,
            "update caixa",
            self.store.update::<CashRegister>(register_id, &settlement),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CaixaError::persistence("Store returned no record for caixa"))?;

        let inserted = bounded(
            self.store_timeout,
            "insert caixa_fechamentos",
            self.store.insert::<CashClosingRecord>(&record),
        )
        .await
        .and_then(|rows| {
            rows.into_iter().next().ok_or_else(|| {
                CaixaError::persistence("Store returned no record for closing")
            })
        });

        let closing = match inserted {
            Ok(closing) => closing,
            Err(err) => {
                self.revert_close(register_id).await;
                return Err(err);
            }
        };

        info!(
            register_id,
            system_amount = %reconciliation.system_amount,
            closing_amount = %reconciliation.closing_amount,
            difference = %reconciliation.difference,
            "Cash register closed"
        );

        self.state.clear();
        Ok(CloseSummary {
            register: closed,
            closing,
            reconciliation,
        })
    }

    /// Puts a register row back to open after a failed close.
    async fn revert_close(&self, register_id: i64) {
        let reverted = bounded(
            self.store_timeout,
            "update caixa",
            self.store
                .update::<CashRegister>(register_id, &RegisterSettlement::reopen()),
        )
        .await;

        match reverted {
            Ok(_) => warn!(register_id, "Closing record not stored, register reopened"),
            Err(e) => error!(
                register_id,
                error = %e,
                "Closing record not stored and register could not be reopened"
            ),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// opening + Σin − Σout for the open register, zero when none is open.
    pub fn current_balance(&self) -> Money {
        self.state.balance()
    }

    /// The open register's movements by time of day.
    pub fn movements(&self) -> Vec<CashMovement> {
        self.state.sorted_movements()
    }

    pub fn movement_totals(&self) -> MovementTotals {
        self.state.totals()
    }

    pub fn overview(&self) -> RegisterOverview {
        RegisterOverview {
            open: self.state.is_open(),
            register: self.state.register().cloned(),
            balance: self.current_balance(),
            totals: self.movement_totals(),
            movements: self.movements(),
        }
    }

    /// Closing records, most recent date first.
    pub async fn closing_history(&self, limit: Option<u32>) -> CaixaResult<Vec<CashClosingRecord>> {
        let mut options = FetchOptions::new().order_by("date", OrderDirection::Desc);
        if let Some(limit) = limit {
            options = options.limit(limit);
        }

        let mut history: Vec<CashClosingRecord> = bounded(
            self.store_timeout,
            "fetch caixa_fechamentos",
            self.store.fetch_all(&options),
        )
        .await?;
        sort_closing_history(&mut history);
        Ok(history)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FlakyStore;
    use crate::error::ErrorCode;
    use crate::state::FixedClock;
    use chrono::NaiveDateTime;
    use vidracaria_core::register::running_balance;
    use vidracaria_core::MAX_AMOUNT;
    use vidracaria_db::MemoryStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 5).unwrap()
    }

    fn at(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2025-06-05 {}", time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn reais(amount: i64) -> Money {
        Money::from_major_minor(amount, 0)
    }

    fn request(kind: MovementKind, amount: i64, method: PaymentMethod) -> MovementRequest {
        MovementRequest {
            kind,
            amount: reais(amount),
            description: format!("{} {}", kind, amount),
            payment_method: method,
            notes: None,
        }
    }

    type Lifecycle<S> = CashRegisterLifecycle<S, Arc<FixedClock>>;

    fn lifecycle<S: RecordStore>(store: Arc<S>) -> (Lifecycle<S>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(at("08:30")));
        (CashRegisterLifecycle::new(store, clock.clone()), clock)
    }

    fn empty() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_full_day_scenario() {
        let store = empty();
        let (mut caixa, clock) = lifecycle(store.clone());

        caixa.open(day(), "08:30", reais(200), Some("Início do expediente")).await.unwrap();
        assert_eq!(caixa.current_balance(), reais(200));

        clock.set(at("09:00"));
        caixa.register_movement(request(MovementKind::In, 150, PaymentMethod::Cash)).await.unwrap();
        assert_eq!(caixa.current_balance(), reais(350));

        clock.set(at("10:30"));
        caixa.register_movement(request(MovementKind::In, 350, PaymentMethod::CreditCard)).await.unwrap();
        assert_eq!(caixa.current_balance(), reais(700));

        clock.set(at("12:30"));
        caixa.register_movement(request(MovementKind::Out, 50, PaymentMethod::Cash)).await.unwrap();
        assert_eq!(caixa.current_balance(), reais(650));

        clock.set(at("18:00"));
        let summary = caixa.close(reais(650), None).await.unwrap();

        assert_eq!(summary.reconciliation.system_amount, reais(650));
        assert_eq!(summary.reconciliation.difference, Money::zero());
        assert_eq!(summary.register.status, RegisterStatus::Closed);
        assert_eq!(summary.register.close_time.as_deref(), Some("18:00"));
        assert_eq!(summary.register.difference, Some(Money::zero()));

        let history = caixa.closing_history(None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, day());
        assert_eq!(history[0].open_time, "08:30");
        assert_eq!(history[0].close_time, "18:00");
        assert_eq!(history[0].total_in, reais(500));
        assert_eq!(history[0].total_out, reais(50));
        assert_eq!(history[0].difference, Money::zero());

        assert!(!caixa.is_open());
        assert_eq!(caixa.current_balance(), Money::zero());
        let stored: CashRegister = store.fetch_by_id(summary.register.id).await.unwrap();
        assert_eq!(stored.status, RegisterStatus::Closed);
        assert_eq!(stored.opening_notes.as_deref(), Some("Início do expediente"));
    }

    #[tokio::test]
    async fn test_shortfall_without_movements() {
        let (mut caixa, _) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        let summary = caixa.close(reais(150), Some("Faltou troco")).await.unwrap();
        assert_eq!(summary.reconciliation.system_amount, reais(200));
        assert_eq!(summary.reconciliation.difference, reais(-50));
        assert_eq!(summary.closing.notes.as_deref(), Some("Faltou troco"));
    }

    #[tokio::test]
    async fn test_amounts_above_maximum_are_rejected_before_storing() {
        let store = empty();
        let (mut caixa, _) = lifecycle(store.clone());

        let err = caixa
            .open(day(), "08:30", Money::parse("90000000000000000").unwrap(), None)
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert_eq!(store.count::<CashRegister>().await, 0);

        caixa.open(day(), "08:30", reais(200), None).await.unwrap();
        let err = caixa
            .register_movement(MovementRequest {
                amount: Money::parse("5000000000000000").unwrap(),
                ..request(MovementKind::In, 1, PaymentMethod::Cash)
            })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert_eq!(store.count::<CashMovement>().await, 0);
        assert_eq!(caixa.current_balance(), reais(200));

        let err = caixa
            .close(Money::from_cents(MAX_AMOUNT.cents() + 1), None)
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert!(caixa.is_open());
    }

    #[tokio::test]
    async fn test_balance_tracks_every_step_of_a_mixed_day() {
        let store = empty();
        let (mut caixa, clock) = lifecycle(store.clone());
        caixa.open(day(), "08:00", Money::from_cents(12_345), None).await.unwrap();

        let steps = [
            (MovementKind::In, 4_990, PaymentMethod::Cash),
            (MovementKind::Out, 1_250, PaymentMethod::Cash),
            (MovementKind::In, 78_000, PaymentMethod::Pix),
            (MovementKind::Out, 20_001, PaymentMethod::BankTransfer),
            (MovementKind::In, 1, PaymentMethod::DebitCard),
            (MovementKind::Out, 99_999, PaymentMethod::Check),
            (MovementKind::In, 35_000, PaymentMethod::CreditCard),
            (MovementKind::Out, 1, PaymentMethod::Other),
            (MovementKind::In, 10_000, PaymentMethod::Cash),
            (MovementKind::Out, 18_500, PaymentMethod::Pix),
        ];

        let mut expected = Money::from_cents(12_345);
        for (i, (kind, cents, method)) in steps.into_iter().enumerate() {
            clock.set(at(&format!("{:02}:{:02}", 9 + i / 2, (i % 2) * 30)));
            caixa
                .register_movement(MovementRequest {
                    kind,
                    amount: Money::from_cents(cents),
                    description: format!("passo {}", i),
                    payment_method: method,
                    notes: None,
                })
                .await
                .unwrap();

            match kind {
                MovementKind::In => expected += Money::from_cents(cents),
                MovementKind::Out => expected -= Money::from_cents(cents),
            }
            assert_eq!(caixa.current_balance(), expected, "after step {}", i);
            assert_eq!(
                caixa.current_balance(),
                running_balance(Money::from_cents(12_345), &caixa.movements())
            );
        }

        let totals = caixa.movement_totals();
        assert_eq!(
            Money::from_cents(12_345) + totals.total_in - totals.total_out,
            expected
        );
        assert_eq!(expected, Money::from_cents(585));

        let mut reloaded = CashRegisterLifecycle::new(store, Arc::new(FixedClock::new(at("19:00"))));
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.current_balance(), expected);

        let summary = caixa.close(Money::zero(), None).await.unwrap();
        assert_eq!(summary.reconciliation.system_amount, expected);
        assert_eq!(summary.reconciliation.difference, Money::from_cents(-585));
    }

    #[tokio::test]
    async fn test_open_twice_is_invalid_state() {
        let (mut caixa, _) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        let err = caixa.open(day(), "09:00", reais(100), None).await.unwrap_err();
        assert!(err.is(ErrorCode::InvalidState));
    }

    #[tokio::test]
    async fn test_open_sees_register_persisted_by_someone_else() {
        let store = Arc::new(MemoryStore::with_demo_data().await.unwrap());
        let (mut caixa, _) = lifecycle(store.clone());

        let err = caixa.open(day(), "08:30", reais(100), None).await.unwrap_err();
        assert!(err.is(ErrorCode::InvalidState));
        assert_eq!(store.count::<CashRegister>().await, 1);
        assert!(!caixa.is_open());
    }

    #[tokio::test]
    async fn test_operations_without_open_register() {
        let (mut caixa, _) = lifecycle(empty());

        let err = caixa
            .register_movement(request(MovementKind::In, 10, PaymentMethod::Pix))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::InvalidState));

        let err = caixa.close(reais(0), None).await.unwrap_err();
        assert!(err.is(ErrorCode::InvalidState));

        assert_eq!(caixa.current_balance(), Money::zero());
        assert!(caixa.movements().is_empty());
    }

    #[tokio::test]
    async fn test_double_close_is_invalid_state() {
        let store = empty();
        let (mut caixa, _) = lifecycle(store.clone());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();
        caixa.close(reais(200), None).await.unwrap();

        let err = caixa.close(reais(200), None).await.unwrap_err();
        assert!(err.is(ErrorCode::InvalidState));
        assert_eq!(store.count::<CashClosingRecord>().await, 1);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected() {
        let store = empty();
        let (mut caixa, _) = lifecycle(store.clone());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        for amount in [0, -10] {
            let err = caixa
                .register_movement(request(MovementKind::In, amount, PaymentMethod::Cash))
                .await
                .unwrap_err();
            assert!(err.is(ErrorCode::ValidationError));
        }
        assert_eq!(store.count::<CashMovement>().await, 0);
        assert_eq!(caixa.current_balance(), reais(200));
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let store = empty();
        let (mut caixa, _) = lifecycle(store.clone());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        let mut req = request(MovementKind::In, 10, PaymentMethod::Cash);
        req.description = "   ".to_string();
        let err = caixa.register_movement(req).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert_eq!(store.count::<CashMovement>().await, 0);
    }

    #[tokio::test]
    async fn test_open_validates_amount_and_time() {
        let store = empty();
        let (mut caixa, _) = lifecycle(store.clone());

        let err = caixa.open(day(), "08:30", reais(-1), None).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));

        let err = caixa.open(day(), "8h30", reais(100), None).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));

        assert_eq!(store.count::<CashRegister>().await, 0);

        caixa.open(day(), "08:30", Money::zero(), None).await.unwrap();
        assert!(caixa.is_open());
    }

    #[tokio::test]
    async fn test_negative_closing_amount_is_rejected() {
        let (mut caixa, _) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        let err = caixa.close(reais(-1), None).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert!(caixa.is_open());
    }

    #[tokio::test]
    async fn test_movement_uses_register_date_and_clock_time() {
        let (mut caixa, clock) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        clock.set(at("23:50") + chrono::Duration::minutes(20));
        let movement = caixa
            .register_movement(request(MovementKind::In, 10, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(movement.date, day());
        assert_eq!(movement.time, "00:10");
    }

    #[tokio::test]
    async fn test_movements_ordered_by_time() {
        let (mut caixa, clock) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(0), None).await.unwrap();

        for (time, amount) in [("11:00", 1), ("09:15", 2), ("11:00", 3)] {
            clock.set(at(time));
            caixa
                .register_movement(request(MovementKind::In, amount, PaymentMethod::Cash))
                .await
                .unwrap();
        }

        let amounts: Vec<Money> = caixa.movements().iter().map(|m| m.amount).collect();
        assert_eq!(amounts, vec![reais(2), reais(1), reais(3)]);
    }

    #[tokio::test]
    async fn test_movement_totals_per_method() {
        let (mut caixa, _) = lifecycle(empty());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();
        caixa.register_movement(request(MovementKind::In, 150, PaymentMethod::Cash)).await.unwrap();
        caixa.register_movement(request(MovementKind::In, 350, PaymentMethod::CreditCard)).await.unwrap();
        caixa.register_movement(request(MovementKind::Out, 50, PaymentMethod::Cash)).await.unwrap();

        let totals = caixa.movement_totals();
        assert_eq!(totals.total_in, reais(500));
        assert_eq!(totals.total_out, reais(50));

        let cash = totals
            .by_method
            .iter()
            .find(|t| t.method == PaymentMethod::Cash)
            .unwrap();
        assert_eq!(cash.total_in, reais(150));
        assert_eq!(cash.total_out, reais(50));

        let overview = caixa.overview();
        assert!(overview.open);
        assert_eq!(overview.balance, reais(650));
        assert_eq!(overview.movements.len(), 3);
    }

    #[tokio::test]
    async fn test_load_demo_register() {
        let store = Arc::new(MemoryStore::with_demo_data().await.unwrap());
        let (mut caixa, _) = lifecycle(store);

        let register = caixa.load().await.unwrap().unwrap();
        assert_eq!(register.date, day());
        assert_eq!(caixa.movements().len(), 3);
        assert_eq!(caixa.current_balance(), reais(650));

        let summary = caixa.close(reais(650), None).await.unwrap();
        assert!(summary.reconciliation.is_balanced());

        let history = caixa.closing_history(None).await.unwrap();
        let dates: Vec<NaiveDate> = history.iter().map(|h| h.date).collect();
        assert_eq!(
            dates,
            vec![
                day(),
                NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            ]
        );
        assert_eq!(caixa.closing_history(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_without_open_register() {
        let (mut caixa, _) = lifecycle(empty());
        assert!(caixa.load().await.unwrap().is_none());
        assert_eq!(caixa.state(), &RegisterState::NoOpenRegister);
    }

    #[tokio::test]
    async fn test_load_prefers_most_recent_open_register() {
        let store = empty();
        for (date, time) in [(day(), "08:30"), (day().succ_opt().unwrap(), "07:00")] {
            store
                .insert::<CashRegister>(&NewCashRegister {
                    date,
                    open_time: time.to_string(),
                    opening_amount: reais(100),
                    status: RegisterStatus::Open,
                    opening_notes: None,
                })
                .await
                .unwrap();
        }

        let (mut caixa, _) = lifecycle(store);
        let register = caixa.load().await.unwrap().unwrap();
        assert_eq!(register.id, 2);
        assert_eq!(register.date, day().succ_opt().unwrap());
    }

    #[tokio::test]
    async fn test_failed_open_keeps_state() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (mut caixa, _) = lifecycle(store.clone());

        store.fail_inserts(true);
        let err = caixa.open(day(), "08:30", reais(200), None).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert!(!caixa.is_open());
        assert_eq!(store.inner.count::<CashRegister>().await, 0);

        store.fail_inserts(false);
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();
        assert!(caixa.is_open());
    }

    #[tokio::test]
    async fn test_failed_open_check_keeps_state() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (mut caixa, _) = lifecycle(store.clone());

        store.fail_reads(true);
        let err = caixa.open(day(), "08:30", reais(200), None).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert!(!caixa.is_open());
        assert_eq!(store.inner.count::<CashRegister>().await, 0);
    }

    #[tokio::test]
    async fn test_failed_movement_keeps_balance() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (mut caixa, _) = lifecycle(store.clone());
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        store.fail_inserts(true);
        let err = caixa
            .register_movement(request(MovementKind::In, 150, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert_eq!(caixa.current_balance(), reais(200));
        assert!(caixa.movements().is_empty());
    }

    #[tokio::test]
    async fn test_failed_register_update_keeps_register_open() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (mut caixa, _) = lifecycle(store.clone());
        let register = caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        store.fail_updates(true);
        let err = caixa.close(reais(200), None).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert!(caixa.is_open());

        let stored: CashRegister = store.inner.fetch_by_id(register.id).await.unwrap();
        assert!(stored.is_open());
        assert_eq!(store.inner.count::<CashClosingRecord>().await, 0);
    }

    #[tokio::test]
    async fn test_failed_closing_record_reopens_register() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (mut caixa, _) = lifecycle(store.clone());
        let register = caixa.open(day(), "08:30", reais(200), None).await.unwrap();
        caixa.register_movement(request(MovementKind::In, 50, PaymentMethod::Pix)).await.unwrap();

        store.fail_inserts_into("caixa_fechamentos");
        let err = caixa.close(reais(250), Some("fim do dia")).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));

        assert!(caixa.is_open());
        assert_eq!(caixa.current_balance(), reais(250));

        let stored: CashRegister = store.inner.fetch_by_id(register.id).await.unwrap();
        assert!(stored.is_open());
        assert_eq!(stored.close_time, None);
        assert_eq!(stored.closing_amount, None);
        assert_eq!(stored.closing_notes, None);
        assert_eq!(store.inner.count::<CashClosingRecord>().await, 0);

        store.fail_inserts(false);
        let summary = caixa.close(reais(250), None).await.unwrap();
        assert!(summary.reconciliation.is_balanced());
    }

    #[tokio::test]
    async fn test_timed_out_store_call_is_persistence_failure() {
        let store = Arc::new(FlakyStore::new(MemoryStore::new()));
        let (caixa, _) = lifecycle(store.clone());
        let mut caixa = caixa.with_timeout(Duration::from_millis(50));
        caixa.open(day(), "08:30", reais(200), None).await.unwrap();

        store.hang(true);
        let err = caixa
            .register_movement(request(MovementKind::In, 150, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert_eq!(caixa.current_balance(), reais(200));

        let err = caixa.close(reais(200), None).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
        assert!(caixa.is_open());
    }

    #[tokio::test]
    async fn test_independent_lifecycles_do_not_share_state() {
        let (mut first, _) = lifecycle(empty());
        let (mut second, _) = lifecycle(empty());

        first.open(day(), "08:30", reais(100), None).await.unwrap();
        second.open(day(), "08:30", reais(300), None).await.unwrap();
        first.register_movement(request(MovementKind::Out, 40, PaymentMethod::Cash)).await.unwrap();

        assert_eq!(first.current_balance(), reais(60));
        assert_eq!(second.current_balance(), reais(300));
    }
}
