//! # Dashboard
//!
//! One screen summing up the shop: this month's ledger, stock alerts, the
//! open register and today's net cash.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │ income (mo.) │ expense (mo.)│ stock alerts │ cash today   │
//! │ R$ 1.550,00  │ R$ 500,00    │ 2 of 3       │ R$ 450,00    │
//! └──────────────┴──────────────┴──────────────┴──────────────┘
//! ```

use std::time::Duration;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;
use vidracaria_core::finance::{EntryFilter, FinanceSummary};
use vidracaria_core::register::movement_totals;
use vidracaria_core::{CashMovement, Money, DATE_FORMAT};
use vidracaria_db::store::{FetchOptions, FilterOp, RecordStore};

use super::bounded;
use super::caixa::RegisterOverview;
use super::estoque::stock_report;
use super::financas::finance_report;
use crate::error::CaixaResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    /// Ledger totals for the calendar month of `date`.
    pub month: FinanceSummary,
    pub product_count: usize,
    pub low_stock_count: usize,
    /// Balance of the open register, `None` when none is open.
    pub register_balance: Option<Money>,
    /// Σin − Σout of every cash movement dated `date`.
    pub cash_today: Money,
}

/// First and last day of `date`'s month.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Builds the dashboard for `today`. `register` is the loaded register's
/// overview.
pub async fn dashboard<S: RecordStore>(
    store: &S,
    register: &RegisterOverview,
    today: NaiveDate,
    limit: Duration,
) -> CaixaResult<Dashboard> {
    let (from, to) = month_bounds(today);
    let filter = EntryFilter {
        from: Some(from),
        to: Some(to),
        ..Default::default()
    };
    let finance = finance_report(store, &filter, today, 1, limit).await?;
    let stock = stock_report(store, limit).await?;

    let movements: Vec<CashMovement> = bounded(
        limit,
        "fetch caixa_movimentacoes",
        store.fetch_all(&FetchOptions::new().filter(
            "date",
            FilterOp::Eq,
            today.format(DATE_FORMAT).to_string(),
        )),
    )
    .await?;
    let cash_today = movement_totals(&movements).net();

    debug!(
        %today,
        entries = finance.entry_count,
        movements = movements.len(),
        "Dashboard computed"
    );

    Ok(Dashboard {
        date: today,
        month: finance.summary,
        product_count: stock.product_count,
        low_stock_count: stock.low_stock.len(),
        register_balance: register.open.then_some(register.balance),
        cash_today,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::caixa::{CashRegisterLifecycle, MovementRequest};
    use crate::commands::testing::FlakyStore;
    use crate::error::ErrorCode;
    use crate::state::FixedClock;
    use std::sync::Arc;
    use vidracaria_core::{MovementKind, PaymentMethod};
    use vidracaria_db::MemoryStore;

    const LIMIT: Duration = Duration::from_secs(5);

    fn reais(amount: i64) -> Money {
        Money::from_major_minor(amount, 0)
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn clock_at(date: NaiveDate) -> Arc<FixedClock> {
        Arc::new(FixedClock::new(date.and_hms_opt(17, 0, 0).unwrap()))
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(june(5)), (june(1), june(30)));
        let feb = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(month_bounds(feb).1, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(month_bounds(dec).1, dec);
    }

    #[tokio::test]
    async fn test_demo_dashboard() {
        let store = Arc::new(MemoryStore::with_demo_data().await.unwrap());
        let mut caixa = CashRegisterLifecycle::new(store.clone(), clock_at(june(5)));
        caixa.load().await.unwrap();

        let board = dashboard(store.as_ref(), &caixa.overview(), june(5), LIMIT)
            .await
            .unwrap();

        assert_eq!(board.month.income, reais(1550));
        assert_eq!(board.month.expense, reais(500));
        assert_eq!(board.product_count, 3);
        assert_eq!(board.low_stock_count, 2);
        assert_eq!(board.register_balance, Some(reais(650)));
        assert_eq!(board.cash_today, reais(450));
    }

    #[tokio::test]
    async fn test_next_day_and_next_month_start_empty() {
        let store = Arc::new(MemoryStore::with_demo_data().await.unwrap());
        let mut caixa = CashRegisterLifecycle::new(store.clone(), clock_at(june(6)));
        caixa.load().await.unwrap();
        caixa.close(reais(650), None).await.unwrap();

        let board = dashboard(store.as_ref(), &caixa.overview(), june(6), LIMIT)
            .await
            .unwrap();
        assert_eq!(board.register_balance, None);
        assert_eq!(board.cash_today, Money::zero());
        assert_eq!(board.month.income, reais(1550));

        let july = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let board = dashboard(store.as_ref(), &caixa.overview(), july, LIMIT)
            .await
            .unwrap();
        assert_eq!(board.month, FinanceSummary::default());
        assert_eq!(board.low_stock_count, 2);
    }

    #[tokio::test]
    async fn test_cash_today_follows_new_movements() {
        let store = Arc::new(MemoryStore::with_demo_data().await.unwrap());
        let mut caixa = CashRegisterLifecycle::new(store.clone(), clock_at(june(5)));
        caixa.load().await.unwrap();
        caixa
            .register_movement(MovementRequest {
                kind: MovementKind::Out,
                amount: reais(80),
                description: "Frete".to_string(),
                payment_method: PaymentMethod::Pix,
                notes: None,
            })
            .await
            .unwrap();

        let board = dashboard(store.as_ref(), &caixa.overview(), june(5), LIMIT)
            .await
            .unwrap();
        assert_eq!(board.cash_today, reais(370));
        assert_eq!(board.register_balance, Some(reais(570)));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = FlakyStore::new(MemoryStore::with_demo_data().await.unwrap());
        store.fail_reads(true);
        let overview = RegisterOverview {
            open: false,
            register: None,
            balance: Money::zero(),
            totals: Default::default(),
            movements: Vec::new(),
        };

        let err = dashboard(&store, &overview, june(5), LIMIT).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
    }
}
