//! # Store State
//!
//! The record store the commands run against: the SQLite database when a
//! path is configured, the demo tables otherwise.
//!
//! ## Thread Safety
//! `SqliteStore` wraps a `SqlitePool` and `MemoryStore` guards its tables
//! with a `RwLock`, so both are shared freely behind an `Arc`.

use async_trait::async_trait;
use tracing::{info, warn};
use vidracaria_core::RecordId;
use vidracaria_db::store::{FetchOptions, Record, RecordStore, Updatable};
use vidracaria_db::{Database, DbConfig, DbResult, MemoryStore, SqliteStore};

use crate::error::CaixaResult;
use crate::state::ConfigState;

#[derive(Debug)]
pub enum StoreState {
    Sqlite { db: Database, store: SqliteStore },
    Demo(MemoryStore),
}

impl StoreState {
    /// Opens the configured backend.
    ///
    /// A database that cannot be opened, migrated or queried within
    /// `database.connect_timeout_secs` is a `PERSISTENCE_FAILURE`; the app
    /// never falls back to demo data on its own.
    pub async fn connect(config: &ConfigState) -> CaixaResult<Self> {
        match (&config.database.path, config.is_demo()) {
            (Some(path), false) => {
                let db_config = DbConfig::new(path)
                    .max_connections(config.database.max_connections)
                    .connect_timeout(config.database.connect_timeout());
                let db = Database::new(db_config).await?;
                info!(path = %path.display(), "Using SQLite store");
                let store = db.store();
                Ok(StoreState::Sqlite { db, store })
            }
            _ => {
                warn!("[DEMO MODE] No database configured, using demo data");
                Ok(StoreState::Demo(MemoryStore::with_demo_data().await?))
            }
        }
    }

    pub fn sqlite(db: Database) -> Self {
        let store = db.store();
        StoreState::Sqlite { db, store }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, StoreState::Demo(_))
    }

    pub async fn close(&self) {
        if let StoreState::Sqlite { db, .. } = self {
            db.close().await;
        }
    }
}

#[async_trait]
impl RecordStore for StoreState {
    async fn fetch_all<T: Record>(&self, options: &FetchOptions) -> DbResult<Vec<T>> {
        match self {
            StoreState::Sqlite { store, .. } => store.fetch_all(options).await,
            StoreState::Demo(store) => store.fetch_all(options).await,
        }
    }

    async fn fetch_by_id<T: Record>(&self, id: RecordId) -> DbResult<T> {
        match self {
            StoreState::Sqlite { store, .. } => store.fetch_by_id(id).await,
            StoreState::Demo(store) => store.fetch_by_id(id).await,
        }
    }

    async fn insert<T: Record>(&self, record: &T::New) -> DbResult<Vec<T>> {
        match self {
            StoreState::Sqlite { store, .. } => store.insert::<T>(record).await,
            StoreState::Demo(store) => store.insert::<T>(record).await,
        }
    }

    async fn update<T: Updatable>(&self, id: RecordId, patch: &T::Patch) -> DbResult<Vec<T>> {
        match self {
            StoreState::Sqlite { store, .. } => store.update::<T>(id, patch).await,
            StoreState::Demo(store) => store.update::<T>(id, patch).await,
        }
    }

    async fn remove<T: Record>(&self, id: RecordId) -> DbResult<bool> {
        match self {
            StoreState::Sqlite { store, .. } => store.remove::<T>(id).await,
            StoreState::Demo(store) => store.remove::<T>(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use vidracaria_core::{CashRegister, Product};

    #[tokio::test]
    async fn test_default_config_connects_to_demo_data() {
        let store = StoreState::connect(&ConfigState::default()).await.unwrap();
        assert!(store.is_demo());

        let registers: Vec<CashRegister> = store.fetch_all(&FetchOptions::new()).await.unwrap();
        assert_eq!(registers.len(), 1);
        assert!(registers[0].is_open());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_persistence_failure() {
        let mut config = ConfigState::default();
        config.database.path = Some("/nonexistent-dir/vidracaria/caixa.db".into());
        config.database.connect_timeout_secs = 2;

        let err = StoreState::connect(&config).await.unwrap_err();
        assert!(err.is(ErrorCode::PersistenceFailure));
    }

    #[tokio::test]
    async fn test_sqlite_store_starts_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = StoreState::sqlite(db);
        assert!(!store.is_demo());

        let products: Vec<Product> = store.fetch_all(&FetchOptions::new()).await.unwrap();
        assert!(products.is_empty());
        store.close().await;
    }
}
