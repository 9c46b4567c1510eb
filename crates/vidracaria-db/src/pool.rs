//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  caixa startup (db_path configured)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐               │                           │
//! │  │  │Conn1│ │Conn2│ │ ... │               │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘               │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.store() ──► SqliteStore (RecordStore)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block writers and writers don't block readers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::store::SqliteStore;

/// Connections idle for longer than this are closed.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

// =============================================================================
// Configuration
// =============================================================================

/// Where the caixa database lives and how the pool reaches it.
///
/// ```rust
/// use std::time::Duration;
/// use vidracaria_db::DbConfig;
///
/// let config = DbConfig::new("/srv/vidracaria/caixa.db")
///     .max_connections(3)
///     .connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_connections, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite file, created on first connect.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Bound on acquiring a connection, including the first one.
    /// Default: 30 seconds
    pub connect_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            // Every connection would otherwise see its own empty database
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        Ok(SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default
            .foreign_keys(true)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle owning the SQLite pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool, applies pending migrations and checks the connection.
    ///
    /// Fails with `ConnectionFailed` when the file cannot be opened within
    /// `connect_timeout`, `MigrationFailed` when the schema cannot be brought
    /// up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            connect_timeout_ms = config.connect_timeout.as_millis() as u64,
            "Opening caixa database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(IDLE_TIMEOUT))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        migrations::run_migrations(&db.pool).await?;
        db.health_check().await?;

        debug!("Database ready");
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the record store over this pool.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    /// Closes the pool. Store operations fail afterwards.
    pub async fn close(&self) {
        info!("Closing caixa database");
        self.pool.close().await;
    }

    /// Runs a trivial query; `ConnectionFailed` when the database does not
    /// answer.
    pub async fn health_check(&self) -> DbResult<()> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(error = %e, "Database health check failed");
                Err(DbError::ConnectionFailed(e.to_string()))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
