//! # SQLite Store
//!
//! [`RecordStore`] over the SQLite pool.
//!
//! ## Query Shape
//! ```text
//! fetch_all::<CashRegister>(status = open, order by date desc, limit 1)
//!      │
//!      ▼
//! SELECT json_object('id', "id", 'date', "date", ...)
//!   FROM "caixa"
//!  WHERE "status" = ?
//!  ORDER BY "date" DESC, "id" ASC
//!  LIMIT ?
//!      │
//!      ▼
//! one JSON text per row ──serde_json──► CashRegister
//! ```
//!
//! Identifiers come from [`Record::COLUMNS`] after validation; values are
//! always bound.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::QueryScalar;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use super::{payload_columns, FetchOptions, FilterOp, OrderDirection, Record, RecordStore, Updatable};
use crate::error::{DbError, DbResult};
use vidracaria_core::RecordId;

type ScalarQuery<'q, O> = QueryScalar<'q, Sqlite, O, <Sqlite as sqlx::Database>::Arguments<'q>>;

/// A bound parameter.
#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl SqlValue {
    /// Text form used by substring filters.
    fn text(value: &Value) -> Self {
        match value {
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

fn bind_values<'q, O>(mut query: ScalarQuery<'q, O>, values: &'q [SqlValue]) -> ScalarQuery<'q, O> {
    for value in values {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

/// `json_object('id', "id", 'col', "col", ...)` for a record's table.
fn row_json<T: Record>() -> String {
    let pairs: Vec<String> = std::iter::once("id")
        .chain(T::COLUMNS.iter().copied())
        .map(|c| format!("'{c}', \"{c}\""))
        .collect();
    format!("json_object({})", pairs.join(", "))
}

fn condition(column: &str, op: FilterOp) -> String {
    let op = match op {
        FilterOp::Like => return format!("instr(\"{column}\", ?) > 0"),
        FilterOp::Eq => "=",
        FilterOp::Neq => "!=",
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
    };
    format!("\"{column}\" {op} ?")
}

fn decode_rows<T: Record>(rows: &[String]) -> DbResult<Vec<T>> {
    rows.iter()
        .map(|row| serde_json::from_str(row).map_err(DbError::from))
        .collect()
}

/// Record store backed by the SQLite pool.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.store();
/// let open = store
///     .fetch_all::<CashRegister>(&FetchOptions::new().filter("status", FilterOp::Eq, "open"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn fetch_all<T: Record>(&self, options: &FetchOptions) -> DbResult<Vec<T>> {
        options.validate::<T>()?;

        let mut sql = format!("SELECT {} FROM \"{}\"", row_json::<T>(), T::TABLE);
        let mut values = Vec::with_capacity(options.filters.len() + 1);

        if !options.filters.is_empty() {
            let conditions: Vec<String> = options
                .filters
                .iter()
                .map(|f| {
                    values.push(match f.op {
                        FilterOp::Like => SqlValue::text(&f.value),
                        _ => SqlValue::from(&f.value),
                    });
                    condition(&f.column, f.op)
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        match options.order_by.as_deref() {
            Some(column) => {
                let direction = match options.order_direction {
                    OrderDirection::Asc => "ASC",
                    OrderDirection::Desc => "DESC",
                };
                sql.push_str(&format!(" ORDER BY \"{column}\" {direction}, \"id\" ASC"));
            }
            None => sql.push_str(" ORDER BY \"id\" ASC"),
        }

        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            sql.push_str(" LIMIT ?");
            values.push(SqlValue::Integer(i64::from(limit)));
        }

        debug!(table = T::TABLE, filters = options.filters.len(), "Fetching records");

        let rows: Vec<String> = bind_values(sqlx::query_scalar(&sql), &values)
            .fetch_all(&self.pool)
            .await?;

        decode_rows(&rows)
    }

    async fn fetch_by_id<T: Record>(&self, id: RecordId) -> DbResult<T> {
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE \"id\" = ?",
            row_json::<T>(),
            T::TABLE
        );

        let row: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| DbError::not_found(T::TABLE, id))?;
        Ok(serde_json::from_str(&row)?)
    }

    async fn insert<T: Record>(&self, record: &T::New) -> DbResult<Vec<T>> {
        let payload = payload_columns::<T>(record)?;

        let sql = if payload.is_empty() {
            format!(
                "INSERT INTO \"{}\" DEFAULT VALUES RETURNING {}",
                T::TABLE,
                row_json::<T>()
            )
        } else {
            let columns: Vec<String> = payload.keys().map(|k| format!("\"{k}\"")).collect();
            let placeholders = vec!["?"; payload.len()].join(", ");
            format!(
                "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
                T::TABLE,
                columns.join(", "),
                placeholders,
                row_json::<T>()
            )
        };
        let values: Vec<SqlValue> = payload.values().map(SqlValue::from).collect();

        let row: String = bind_values(sqlx::query_scalar(&sql), &values)
            .fetch_one(&self.pool)
            .await?;
        let inserted: T = serde_json::from_str(&row)?;

        debug!(table = T::TABLE, id = inserted.id(), "Inserted record");
        Ok(vec![inserted])
    }

    async fn update<T: Updatable>(&self, id: RecordId, patch: &T::Patch) -> DbResult<Vec<T>> {
        let payload = payload_columns::<T>(patch)?;
        if payload.is_empty() {
            return Ok(vec![self.fetch_by_id::<T>(id).await?]);
        }

        let assignments: Vec<String> = payload.keys().map(|k| format!("\"{k}\" = ?")).collect();
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ? RETURNING {}",
            T::TABLE,
            assignments.join(", "),
            row_json::<T>()
        );
        let mut values: Vec<SqlValue> = payload.values().map(SqlValue::from).collect();
        values.push(SqlValue::Integer(id));

        let row: Option<String> = bind_values(sqlx::query_scalar(&sql), &values)
            .fetch_optional(&self.pool)
            .await?;
        let row = row.ok_or_else(|| DbError::not_found(T::TABLE, id))?;

        debug!(table = T::TABLE, id, "Updated record");
        Ok(vec![serde_json::from_str(&row)?])
    }

    async fn remove<T: Record>(&self, id: RecordId) -> DbResult<bool> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = ?", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        debug!(table = T::TABLE, id, removed = result.rows_affected(), "Removed record");
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
