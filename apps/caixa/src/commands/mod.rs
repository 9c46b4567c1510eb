//! # Commands
//!
//! Operations invoked by the CLI. Each one validates with `vidracaria-core`,
//! writes through a [`RecordStore`](vidracaria_db::RecordStore) and returns
//! a serializable result.
//!
//! - [`caixa`] - Cash register lifecycle (open, movements, close, history)
//! - [`estoque`] - Stock movements and alerts
//! - [`financas`] - Ledger entries and aggregates
//! - [`painel`] - Dashboard summary

pub mod caixa;
pub mod estoque;
pub mod financas;
pub mod painel;

use std::future::Future;
use std::time::Duration;

use tracing::error;
use vidracaria_db::{DbError, DbResult};

use crate::error::CaixaResult;

/// Runs a store call with an upper bound on how long it may take.
///
/// Both a store error and an elapsed timeout come back as a `CaixaError`.
pub async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> CaixaResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(DbError::timeout(operation, limit.as_secs()).into())
        }
    }
}
