//! # Record Store
//!
//! Table-oriented access shared by every screen: fetch a filtered list,
//! fetch one by id, insert, update, remove.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lifecycle / command                                                   │
//! │       │                                                                 │
//! │       │  store.fetch_all::<CashRegister>(&FetchOptions::new()          │
//! │       │      .filter("status", FilterOp::Eq, "open"))                  │
//! │       ▼                                                                 │
//! │  RecordStore (trait)                                                   │
//! │  ├── SqliteStore  ── SELECT json_object(...) FROM caixa WHERE ...      │
//! │  └── MemoryStore  ── demo tables as JSON rows behind a RwLock          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON row ──serde──► CashRegister                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both backends validate every column named by a filter, an ordering or a
//! payload against [`Record::COLUMNS`], so the SQL built by the SQLite store
//! only ever contains known identifiers.

pub mod memory;
pub mod records;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::{DbError, DbResult};
use vidracaria_core::RecordId;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

// =============================================================================
// Record Traits
// =============================================================================

/// A row type stored in one table.
///
/// Rows travel as JSON objects whose keys are `id` plus [`Record::COLUMNS`].
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Table name, e.g. `caixa`.
    const TABLE: &'static str;

    /// Every column except `id`, in schema order.
    const COLUMNS: &'static [&'static str];

    /// The record before insertion (no id).
    type New: Serialize + Send + Sync;

    fn id(&self) -> RecordId;

    /// Whether `column` exists on this table.
    fn has_column(column: &str) -> bool {
        column == "id" || Self::COLUMNS.contains(&column)
    }
}

/// A record that can be patched after insertion.
pub trait Updatable: Record {
    /// Fields written by an update. Every serialized key is written.
    type Patch: Serialize + Send + Sync;
}

// =============================================================================
// Fetch Options
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring containment, case-sensitive.
    Like,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Options for [`RecordStore::fetch_all`].
///
/// Filters are applied conjunctively. Without `order_by` rows come back in
/// id order. Ties in the ordered column are broken by id, ascending.
///
/// ## Example
/// ```rust
/// use vidracaria_db::store::{FetchOptions, FilterOp, OrderDirection};
///
/// let options = FetchOptions::new()
///     .filter("status", FilterOp::Eq, "open")
///     .order_by("date", OrderDirection::Desc)
///     .limit(1);
///
/// assert_eq!(options.filters.len(), 1);
/// assert_eq!(options.limit, Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    pub limit: Option<u32>,
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_direction: OrderDirection,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        column: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(column.into());
        self.order_direction = direction;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks every referenced column against the record's table.
    pub fn validate<T: Record>(&self) -> DbResult<()> {
        let columns = self
            .filters
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.order_by.as_deref());

        for column in columns {
            if !T::has_column(column) {
                return Err(DbError::unknown_column(T::TABLE, column));
            }
        }
        Ok(())
    }
}

// =============================================================================
// RecordStore Trait
// =============================================================================

/// Generic table accessor.
///
/// ## Contract
/// - `insert` and `update` return a list holding the persisted record
/// - `fetch_by_id` and `update` fail with `NotFound` for a missing id
/// - `remove` reports whether a row was deleted
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_all<T: Record>(&self, options: &FetchOptions) -> DbResult<Vec<T>>;

    async fn fetch_by_id<T: Record>(&self, id: RecordId) -> DbResult<T>;

    async fn insert<T: Record>(&self, record: &T::New) -> DbResult<Vec<T>>;

    async fn update<T: Updatable>(&self, id: RecordId, patch: &T::Patch) -> DbResult<Vec<T>>;

    async fn remove<T: Record>(&self, id: RecordId) -> DbResult<bool>;
}

// =============================================================================
// Payload Helpers
// =============================================================================

/// Serializes an insert or update payload into its column map.
pub(crate) fn payload_columns<T: Record>(
    payload: &impl Serialize,
) -> DbResult<serde_json::Map<String, Value>> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => {
            if let Some(column) = map
                .keys()
                .find(|k| k.as_str() == "id" || !T::has_column(k.as_str()))
            {
                return Err(DbError::unknown_column(T::TABLE, column.as_str()));
            }
            Ok(map)
        }
        other => Err(DbError::Serialization(format!(
            "{} payload must be an object, got {}",
            T::TABLE,
            other
        ))),
    }
}

/// Total order over stored JSON values: null, then numbers, then strings.
///
/// Matches SQLite's ordering of NULL, INTEGER/REAL and TEXT.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) | Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
        }
    }

    fn as_number(v: &Value) -> f64 {
        match v {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            _ => 0.0,
        }
    }

    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ if rank(a) == 1 && rank(b) == 1 => {
            match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => as_number(a)
                    .partial_cmp(&as_number(b))
                    .unwrap_or(Ordering::Equal),
            }
        }
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vidracaria_core::CashRegister;

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new()
            .filter("status", FilterOp::Eq, "open")
            .filter("opening_amount", FilterOp::Gte, 10000)
            .order_by("date", OrderDirection::Asc)
            .limit(5);

        assert_eq!(options.filters.len(), 2);
        assert_eq!(options.filters[1].value, json!(10000));
        assert_eq!(options.order_by.as_deref(), Some("date"));
        assert_eq!(options.order_direction, OrderDirection::Asc);
        assert_eq!(options.limit, Some(5));
    }

    #[test]
    fn test_default_direction_is_desc() {
        assert_eq!(FetchOptions::new().order_direction, OrderDirection::Desc);

        let parsed: FetchOptions = serde_json::from_str(r#"{"limit": 3}"#).unwrap();
        assert_eq!(parsed.order_direction, OrderDirection::Desc);
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn test_validate_rejects_unknown_columns() {
        let ok = FetchOptions::new()
            .filter("id", FilterOp::Gt, 0)
            .order_by("date", OrderDirection::Desc);
        assert!(ok.validate::<CashRegister>().is_ok());

        let bad = FetchOptions::new().filter("status; DROP TABLE caixa", FilterOp::Eq, "x");
        assert!(matches!(
            bad.validate::<CashRegister>(),
            Err(DbError::UnknownColumn { .. })
        ));

        let bad_order = FetchOptions::new().order_by("valor_inicial", OrderDirection::Asc);
        assert!(bad_order.validate::<CashRegister>().is_err());
    }

    #[test]
    fn test_payload_columns_rejects_id() {
        let err = payload_columns::<CashRegister>(&json!({"id": 3, "status": "open"}));
        assert!(matches!(err, Err(DbError::UnknownColumn { .. })));

        let err = payload_columns::<CashRegister>(&json!(42));
        assert!(matches!(err, Err(DbError::Serialization(_))));
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(1), &json!(2)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(
            compare_values(&json!("2025-06-04"), &json!("2025-06-05")),
            Ordering::Less
        );
        assert_eq!(compare_values(&Value::Null, &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(999), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!("x"), &json!("x")), Ordering::Equal);
    }
}
