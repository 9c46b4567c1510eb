//! # Memory Store
//!
//! In-process tables used in demo mode, when no database is configured.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ MemoryStore                                              │
//! │   RwLock<HashMap<table, Vec<JSON row>>>                  │
//! │                                                          │
//! │   caixa                 [{id: 1, status: "open", ...}]   │
//! │   caixa_movimentacoes   [{id: 1, ...}, {id: 2, ...}]     │
//! │   ...                                                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! New ids are `max(existing) + 1`. Nothing survives the process.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    compare_values, payload_columns, FetchOptions, Filter, FilterOp, OrderDirection, Record,
    RecordStore, Updatable,
};
use crate::demo;
use crate::error::{DbError, DbResult};
use vidracaria_core::RecordId;

type Row = Map<String, Value>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
}

impl MemoryStore {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables pre-populated with the demo dataset.
    pub async fn with_demo_data() -> DbResult<Self> {
        let store = Self::new();
        demo::load(&store).await?;
        Ok(store)
    }

    /// Number of rows in a table.
    pub async fn count<T: Record>(&self) -> usize {
        self.tables
            .read()
            .await
            .get(T::TABLE)
            .map_or(0, Vec::len)
    }
}

fn row_id(row: &Row) -> RecordId {
    row.get("id").and_then(Value::as_i64).unwrap_or_default()
}

fn decode<T: Record>(row: &Row) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(row.clone()))?)
}

/// SQL comparison semantics: anything compared with null is false.
fn row_matches(row: &Row, filter: &Filter) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    if cell.is_null() || filter.value.is_null() {
        return false;
    }

    if filter.op == FilterOp::Like {
        let needle = match &filter.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return match cell {
            Value::String(s) => s.contains(&needle),
            other => other.to_string().contains(&needle),
        };
    }

    let ordering = compare_values(cell, &filter.value);
    match filter.op {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Neq => ordering != Ordering::Equal,
        FilterOp::Gt => ordering == Ordering::Greater,
        FilterOp::Gte => ordering != Ordering::Less,
        FilterOp::Lt => ordering == Ordering::Less,
        FilterOp::Lte => ordering != Ordering::Greater,
        FilterOp::Like => false,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all<T: Record>(&self, options: &FetchOptions) -> DbResult<Vec<T>> {
        options.validate::<T>()?;
        debug!(table = T::TABLE, "[DEMO MODE] Fetching records");

        let tables = self.tables.read().await;
        let mut rows: Vec<&Row> = tables
            .get(T::TABLE)
            .map(|rows| {
                rows.iter()
                    .filter(|row| options.filters.iter().all(|f| row_matches(row, f)))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(column) = options.order_by.as_deref() {
            rows.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(column).unwrap_or(&Value::Null),
                    b.get(column).unwrap_or(&Value::Null),
                );
                let ordering = match options.order_direction {
                    OrderDirection::Asc => ordering,
                    OrderDirection::Desc => ordering.reverse(),
                };
                ordering.then_with(|| row_id(a).cmp(&row_id(b)))
            });
        }

        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            rows.truncate(limit as usize);
        }

        rows.into_iter().map(|row| decode::<T>(row)).collect()
    }

    async fn fetch_by_id<T: Record>(&self, id: RecordId) -> DbResult<T> {
        let tables = self.tables.read().await;
        let row = tables
            .get(T::TABLE)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == id))
            .ok_or_else(|| DbError::not_found(T::TABLE, id))?;
        decode(row)
    }

    async fn insert<T: Record>(&self, record: &T::New) -> DbResult<Vec<T>> {
        let mut row = payload_columns::<T>(record)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(T::TABLE).or_default();
        let id = rows.iter().map(row_id).max().unwrap_or(0) + 1;
        row.insert("id".to_string(), Value::from(id));

        let inserted = decode::<T>(&row)?;
        rows.push(row);

        debug!(table = T::TABLE, id, "[DEMO MODE] Inserted record");
        Ok(vec![inserted])
    }

    async fn update<T: Updatable>(&self, id: RecordId, patch: &T::Patch) -> DbResult<Vec<T>> {
        let patch = payload_columns::<T>(patch)?;

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(T::TABLE)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == id))
            .ok_or_else(|| DbError::not_found(T::TABLE, id))?;

        let mut updated = row.clone();
        updated.extend(patch);
        let record = decode::<T>(&updated)?;
        *row = updated;

        debug!(table = T::TABLE, id, "[DEMO MODE] Updated record");
        Ok(vec![record])
    }

    async fn remove<T: Record>(&self, id: RecordId) -> DbResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(T::TABLE) else {
            return Ok(false);
        };

        let before = rows.len();
        rows.retain(|row| row_id(row) != id);
        let removed = rows.len() < before;

        debug!(table = T::TABLE, id, removed, "[DEMO MODE] Removed record");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use vidracaria_core::{
        CashClosingRecord, CashMovement, CashRegister, FinanceEntry, Money, NewFinanceEntry,
        EntryKind, RegisterSettlement, RegisterStatus,
    };

    fn filter(column: &str, op: FilterOp, value: Value) -> Filter {
        Filter {
            column: column.to_string(),
            op,
            value,
        }
    }

    #[test]
    fn test_matches_null_is_never_true() {
        let row: Row = json!({"id": 1, "notes": null, "amount": 5})
            .as_object()
            .unwrap()
            .clone();

        assert!(!row_matches(&row, &filter("notes", FilterOp::Eq, Value::Null)));
        assert!(!row_matches(&row, &filter("notes", FilterOp::Neq, json!("x"))));
        assert!(!row_matches(&row, &filter("notes", FilterOp::Like, json!(""))));
        assert!(row_matches(&row, &filter("amount", FilterOp::Gte, json!(5))));
        assert!(!row_matches(&row, &filter("amount", FilterOp::Gt, json!(5))));
    }

    #[tokio::test]
    async fn test_demo_data_is_loaded() {
        let store = MemoryStore::with_demo_data().await.unwrap();

        assert_eq!(store.count::<CashRegister>().await, 1);
        assert_eq!(store.count::<CashMovement>().await, 3);
        assert_eq!(store.count::<CashClosingRecord>().await, 2);

        let open: Vec<CashRegister> = store
            .fetch_all(&FetchOptions::new().filter("status", FilterOp::Eq, "open"))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].opening_amount.cents(), 20000);
    }

    #[tokio::test]
    async fn test_insert_uses_max_plus_one() {
        let store = MemoryStore::with_demo_data().await.unwrap();
        assert!(store.remove::<FinanceEntry>(2).await.unwrap());

        let inserted: Vec<FinanceEntry> = store
            .insert::<FinanceEntry>(&NewFinanceEntry {
                date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
                kind: EntryKind::Expense,
                category: "Energia".to_string(),
                description: "Conta de luz".to_string(),
                amount: Money::from_cents(30000),
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(inserted[0].id, 4);
    }

    #[tokio::test]
    async fn test_history_ordering() {
        let store = MemoryStore::with_demo_data().await.unwrap();
        let history: Vec<CashClosingRecord> = store
            .fetch_all(&FetchOptions::new().order_by("date", OrderDirection::Desc))
            .await
            .unwrap();

        let dates: Vec<String> = history.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-06-04", "2025-06-03"]);
        assert_eq!(history[1].difference.cents(), -5000);
    }

    #[tokio::test]
    async fn test_update_and_not_found() {
        let store = MemoryStore::with_demo_data().await.unwrap();

        let closed = store
            .update::<CashRegister>(
                1,
                &RegisterSettlement {
                    status: RegisterStatus::Closed,
                    close_time: Some("18:00".to_string()),
                    closing_amount: Some(Money::from_cents(65000)),
                    system_amount: Some(Money::from_cents(65000)),
                    difference: Some(Money::zero()),
                    closing_notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(closed[0].status, RegisterStatus::Closed);
        assert_eq!(closed[0].opening_notes.as_deref(), Some("Início do expediente"));

        let fetched: CashRegister = store.fetch_by_id(1).await.unwrap();
        assert_eq!(fetched, closed[0]);

        let missing = store
            .update::<CashRegister>(42, &RegisterSettlement::reopen())
            .await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
        assert!(matches!(
            store.fetch_by_id::<CashRegister>(42).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_returns_false() {
        let store = MemoryStore::new();
        assert!(!store.remove::<CashRegister>(1).await.unwrap());
    }
}
