//! # Ledger Commands
//!
//! Income and expense entries plus the aggregates behind the dashboard
//! charts: totals, a per-month series and a per-category breakdown.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use vidracaria_core::finance::{
    category_breakdown, monthly_series, summarize, CategoryTotal, EntryFilter, FinanceSummary,
    MonthBucket,
};
use vidracaria_core::validation::{
    validate_description, validate_movement_amount, validate_notes, validate_required_text,
};
use vidracaria_core::{
    EntryKind, FinanceEntry, Money, NewFinanceEntry, RecordId, MAX_DESCRIPTION_LENGTH,
};
use vidracaria_db::store::{FetchOptions, OrderDirection, RecordStore};

use super::bounded;
use crate::error::{CaixaError, CaixaResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinanceReport {
    pub entry_count: usize,
    pub summary: FinanceSummary,
    /// Oldest month first.
    pub months: Vec<MonthBucket>,
    pub categories: Vec<CategoryTotal>,
}

pub async fn add_entry<S: RecordStore>(
    store: &S,
    request: EntryRequest,
    limit: Duration,
) -> CaixaResult<FinanceEntry> {
    validate_movement_amount(request.amount)?;
    let category = validate_required_text("category", &request.category, MAX_DESCRIPTION_LENGTH)?;
    let description = validate_description(&request.description)?;
    let notes = validate_notes(request.notes.as_deref())?;

    let new = NewFinanceEntry {
        date: request.date,
        kind: request.kind,
        category,
        description,
        amount: request.amount,
        notes,
    };

    let entry = bounded(limit, "insert financas", store.insert::<FinanceEntry>(&new))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CaixaError::persistence("Store returned no record for financas"))?;

    info!(
        entry_id = entry.id,
        kind = %entry.kind,
        amount = %entry.amount,
        category = %entry.category,
        "Ledger entry added"
    );
    Ok(entry)
}

pub async fn remove_entry<S: RecordStore>(
    store: &S,
    id: RecordId,
    limit: Duration,
) -> CaixaResult<()> {
    let removed = bounded(limit, "remove financas", store.remove::<FinanceEntry>(id)).await?;
    if !removed {
        return Err(CaixaError::not_found("Ledger entry", &id.to_string()));
    }
    info!(entry_id = id, "Ledger entry removed");
    Ok(())
}

/// Entries matching `filter`, most recent first.
pub async fn list_entries<S: RecordStore>(
    store: &S,
    filter: &EntryFilter,
    limit: Duration,
) -> CaixaResult<Vec<FinanceEntry>> {
    let entries: Vec<FinanceEntry> = bounded(
        limit,
        "fetch financas",
        store.fetch_all(&FetchOptions::new().order_by("date", OrderDirection::Desc)),
    )
    .await?;

    Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
}

/// Totals, `months` monthly buckets ending at `reference`, and the category
/// breakdown for the entries matching `filter`.
pub async fn finance_report<S: RecordStore>(
    store: &S,
    filter: &EntryFilter,
    reference: NaiveDate,
    months: u32,
    limit: Duration,
) -> CaixaResult<FinanceReport> {
    let entries = list_entries(store, filter, limit).await?;

    Ok(FinanceReport {
        entry_count: entries.len(),
        summary: summarize(&entries),
        months: monthly_series(&entries, reference, months),
        categories: category_breakdown(&entries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use vidracaria_db::MemoryStore;

    const LIMIT: Duration = Duration::from_secs(5);

    fn reais(amount: i64) -> Money {
        Money::from_major_minor(amount, 0)
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[tokio::test]
    async fn test_demo_report() {
        let store = MemoryStore::with_demo_data().await.unwrap();
        let report = finance_report(&store, &EntryFilter::default(), june(15), 6, LIMIT)
            .await
            .unwrap();

        assert_eq!(report.entry_count, 3);
        assert_eq!(report.summary.income, reais(1550));
        assert_eq!(report.summary.expense, reais(500));
        assert_eq!(report.summary.balance, reais(1050));

        assert_eq!(report.months.len(), 6);
        let last = report.months.last().unwrap();
        assert_eq!((last.year, last.month), (2025, 6));
        assert_eq!(last.balance, reais(1050));
        assert!(report.months[..5].iter().all(|m| m.income.is_zero() && m.expense.is_zero()));

        let categories: Vec<&str> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["Venda de produtos", "Fornecedores", "Instalação"]);
    }

    #[tokio::test]
    async fn test_filtered_report() {
        let store = MemoryStore::with_demo_data().await.unwrap();
        let filter = EntryFilter {
            kind: Some(EntryKind::Expense),
            ..Default::default()
        };
        let report = finance_report(&store, &filter, june(15), 1, LIMIT).await.unwrap();

        assert_eq!(report.entry_count, 1);
        assert_eq!(report.summary.income, Money::zero());
        assert_eq!(report.summary.balance, reais(-500));
    }

    #[tokio::test]
    async fn test_add_and_remove_entry() {
        let store = MemoryStore::with_demo_data().await.unwrap();
        let entry = add_entry(
            &store,
            EntryRequest {
                date: june(20),
                kind: EntryKind::Expense,
                category: " Aluguel ".to_string(),
                description: "Aluguel do galpão".to_string(),
                amount: reais(1500),
                notes: Some("".to_string()),
            },
            LIMIT,
        )
        .await
        .unwrap();

        assert_eq!(entry.id, 4);
        assert_eq!(entry.category, "Aluguel");
        assert_eq!(entry.notes, None);

        let listed = list_entries(&store, &EntryFilter::default(), LIMIT).await.unwrap();
        assert_eq!(listed[0].id, 4);

        remove_entry(&store, 4, LIMIT).await.unwrap();
        let err = remove_entry(&store, 4, LIMIT).await.unwrap_err();
        assert!(err.is(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_invalid_entry_is_rejected() {
        let store = MemoryStore::new();
        let request = EntryRequest {
            date: june(20),
            kind: EntryKind::Income,
            category: "".to_string(),
            description: "Venda".to_string(),
            amount: reais(10),
            notes: None,
        };

        let err = add_entry(&store, request.clone(), LIMIT).await.unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));

        let err = add_entry(
            &store,
            EntryRequest {
                category: "Vendas".to_string(),
                amount: Money::zero(),
                ..request
            },
            LIMIT,
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
        assert_eq!(store.count::<FinanceEntry>().await, 0);
    }
}
