//! # Finance Aggregation
//!
//! Totals, monthly series and category breakdown over ledger entries.
//!
//! ## Monthly Series
//! ```text
//! reference = 2025-06, months = 3
//!
//!   2025-04        2025-05        2025-06
//!   [01..30]       [01..31]       [01..30]     inclusive day bounds
//!   income/exp     income/exp     income/exp   oldest bucket first
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::money::Money;
use crate::types::{EntryKind, FinanceEntry};

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FinanceSummary {
    pub income: Money,
    pub expense: Money,
    /// income − expense
    pub balance: Money,
}

pub fn summarize<'a, I>(entries: I) -> FinanceSummary
where
    I: IntoIterator<Item = &'a FinanceEntry>,
{
    let mut summary = FinanceSummary::default();
    for entry in entries {
        match entry.kind {
            EntryKind::Income => summary.income += entry.amount,
            EntryKind::Expense => summary.expense += entry.amount,
        }
    }
    summary.balance = summary.income - summary.expense;
    summary
}

// =============================================================================
// Filtering
// =============================================================================

/// Ledger listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &FinanceEntry) -> bool {
        self.kind.map_or(true, |k| entry.kind == k)
            && self
                .category
                .as_deref()
                .map_or(true, |c| entry.category == c)
            && self.from.map_or(true, |from| entry.date >= from)
            && self.to.map_or(true, |to| entry.date <= to)
    }

    pub fn apply<'a>(&self, entries: &'a [FinanceEntry]) -> Vec<&'a FinanceEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

// =============================================================================
// Monthly Series
// =============================================================================

/// One calendar month of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

impl MonthBucket {
    /// Short label such as `jun/25`.
    pub fn label(&self) -> String {
        const NAMES: [&str; 12] = [
            "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
        ];
        let name = NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{}/{:02}", name, self.year.rem_euclid(100))
    }
}

/// First day of the month containing `date`.
fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Builds `months` buckets ending at the month containing `reference`,
/// oldest first.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use vidracaria_core::finance::monthly_series;
///
/// let reference = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
/// let series = monthly_series(&[], reference, 6);
/// assert_eq!(series.len(), 6);
/// assert_eq!((series[0].year, series[0].month), (2025, 1));
/// assert_eq!((series[5].year, series[5].month), (2025, 6));
/// ```
pub fn monthly_series(
    entries: &[FinanceEntry],
    reference: NaiveDate,
    months: u32,
) -> Vec<MonthBucket> {
    (0..months)
        .rev()
        .filter_map(|back| month_start(reference).checked_sub_months(Months::new(back)))
        .map(|start| {
            let end = month_end(start);
            let summary = summarize(
                entries
                    .iter()
                    .filter(|e| e.date >= start && e.date <= end),
            );
            MonthBucket {
                year: start.year(),
                month: start.month(),
                income: summary.income,
                expense: summary.expense,
                balance: summary.balance,
            }
        })
        .collect()
}

// =============================================================================
// Category Breakdown
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
}

/// Sums amounts per category, largest first; ties ordered by name.
pub fn category_breakdown<'a, I>(entries: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a FinanceEntry>,
{
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.category.as_str()).or_default() += entry.amount;
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect();
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    breakdown
}

// =============================================================================
// Unit Tests
// =============================================================================
