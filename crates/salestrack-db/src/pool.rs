//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Caller startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() / DbConfig::new(path)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteExecutor ──► customers() / products() / sales()                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ConfigError, DbError, DbResult};
use crate::executor::{QueryExecutor, SqliteExecutor};
use crate::migrations;
use crate::repository::customer::CustomerStore;
use crate::repository::product::ProductStore;
use crate::repository::sale::SaleStore;

// =============================================================================
// Configuration
// =============================================================================

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

const DEFAULT_DB_PATH: &str = "salestrack.db";

const ENV_DB_PATH: &str = "SALESTRACK_DB_PATH";
const ENV_MAX_CONNECTIONS: &str = "SALESTRACK_DB_MAX_CONNECTIONS";
const ENV_MIN_CONNECTIONS: &str = "SALESTRACK_DB_MIN_CONNECTIONS";
const ENV_CONNECT_TIMEOUT: &str = "SALESTRACK_DB_CONNECT_TIMEOUT_SECS";
const ENV_RUN_MIGRATIONS: &str = "SALESTRACK_DB_RUN_MIGRATIONS";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/salestrack.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or [`IN_MEMORY_PATH`].
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a connection before giving up.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps idle
    /// connections open.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Age at which a connection is closed and replaced. `None` never
    /// recycles.
    /// Default: 30 minutes
    pub max_lifetime: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    ///   [`IN_MEMORY_PATH`] selects an in-memory database whose connections
    ///   are never recycled.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let database_path = path.into();
        let recycle = database_path.as_os_str() != IN_MEMORY_PATH;

        DbConfig {
            database_path,
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: recycle.then(|| Duration::from_secs(600)),
            max_lifetime: recycle.then(|| Duration::from_secs(1800)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every `Database` built from this config gets its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            // The database lives only as long as its one connection.
            idle_timeout: None,
            max_lifetime: None,
            run_migrations: true,
        }
    }

    /// Returns true if this config selects an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Loads configuration from environment variables.
    ///
    /// ## Variables
    /// | Variable                               | Default          |
    /// |----------------------------------------|------------------|
    /// | `SALESTRACK_DB_PATH`                   | `salestrack.db`  |
    /// | `SALESTRACK_DB_MAX_CONNECTIONS`        | 5                |
    /// | `SALESTRACK_DB_MIN_CONNECTIONS`        | 1                |
    /// | `SALESTRACK_DB_CONNECT_TIMEOUT_SECS`   | 30               |
    /// | `SALESTRACK_DB_RUN_MIGRATIONS`         | true             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(ENV_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(value) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = parse_var(ENV_MAX_CONNECTIONS, value)?;
        }
        if let Some(value) = lookup(ENV_MIN_CONNECTIONS) {
            config.min_connections = parse_var(ENV_MIN_CONNECTIONS, value)?;
        }
        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = Duration::from_secs(parse_var(ENV_CONNECT_TIMEOUT, value)?);
        }
        if let Some(value) = lookup(ENV_RUN_MIGRATIONS) {
            config.run_migrations = parse_var(ENV_RUN_MIGRATIONS, value)?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing store access.
///
/// Cloning is cheap: the pool is reference-counted.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
///
/// let customer = db.customers().get_by_id(1).await?;
/// let unshipped = db.sales().get_unshipped().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Errors
    /// * `DbError::ConnectionFailed` - the file can't be opened or created
    /// * `DbError::MigrationFailed` - the schema could not be applied
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let base_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
        };

        let connect_options = base_options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // sale → customer, line_item → sale/product
            .foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent: already-applied migrations are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the shared query executor the stores run on.
    pub fn executor(&self) -> Arc<dyn QueryExecutor> {
        Arc::new(SqliteExecutor::new(self.pool.clone()))
    }

    /// Returns the customer store.
    pub fn customers(&self) -> CustomerStore {
        CustomerStore::new(self.executor())
    }

    /// Returns the product store.
    pub fn products(&self) -> ProductStore {
        ProductStore::new(self.executor())
    }

    /// Returns the sale store (sales and their line items).
    pub fn sales(&self) -> SaleStore {
        SaleStore::new(self.executor())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, every store operation fails with
    /// `DbError::ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        assert!(config.is_in_memory());

        let db = Database::new(config).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_connection_is_never_recycled() {
        let config = DbConfig::in_memory();
        assert_eq!(config.max_lifetime, None);
        assert_eq!(config.idle_timeout, None);

        let db = Database::new(config).await.unwrap();
        let options = db.pool().options();
        assert_eq!(options.get_max_lifetime(), None);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_connections(), 1);

        let file = DbConfig::new("/tmp/salestrack.db");
        assert_eq!(file.max_lifetime, Some(Duration::from_secs(1800)));

        let from_env =
            DbConfig::from_lookup(|key| (key == "SALESTRACK_DB_PATH").then(|| ":memory:".to_string()))
                .unwrap();
        assert!(from_env.is_in_memory());
        assert_eq!(from_env.max_lifetime, None);
        assert_eq!(from_env.idle_timeout, None);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO customer (name, street_address1, city, state, zip_code) VALUES ('A', 'B', 'C', 'DE', '12345')")
            .execute(a.pool())
            .await
            .unwrap();

        assert_eq!(a.customers().get_all().await.unwrap().len(), 1);
        assert!(b.customers().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_file_is_connection_failure() {
        let config = DbConfig::new("/nonexistent-salestrack-dir/nested/db.sqlite")
            .connect_timeout(Duration::from_secs(2));

        let err = Database::new(config).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_fails_store_calls_with_connection_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        let err = db.customers().get_by_id(1).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SALESTRACK_DB_PATH", "/var/lib/salestrack/sales.db"),
            ("SALESTRACK_DB_MAX_CONNECTIONS", "8"),
            ("SALESTRACK_DB_CONNECT_TIMEOUT_SECS", "3"),
            ("SALESTRACK_DB_RUN_MIGRATIONS", "false"),
        ]);

        let config =
            DbConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/salestrack/sales.db")
        );
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_config_defaults_when_unset() {
        let config = DbConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_path, PathBuf::from("salestrack.db"));
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_config_rejects_unparseable_values() {
        let err = DbConfig::from_lookup(|key| {
            (key == "SALESTRACK_DB_MAX_CONNECTIONS").then(|| "many".to_string())
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, ref value }
                if key == "SALESTRACK_DB_MAX_CONNECTIONS" && value == "many"
        ));
    }
}
