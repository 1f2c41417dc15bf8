//! # salestrack-db: Data-Access Layer for salestrack
//!
//! Typed CRUD access to customers, products, sales and line items stored in
//! SQLite, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        salestrack Data Flow                             │
//! │                                                                         │
//! │  Presentation layer (not in workspace)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  salestrack-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Stores     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ CustomerStore │    │ 001_init.sql │  │   │
//! │  │   │ DbConfig      │───►│ ProductStore  │    │              │  │   │
//! │  │   │               │    │ SaleStore     │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ Arc<dyn QueryExecutor>        │   │
//! │  │                                ▼                               │   │
//! │  │                         SqliteExecutor                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`executor`] - The query-execution seam the stores run on
//! - [`repository`] - Customer, product and sale stores
//! - [`seed`] - Sample data for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use salestrack_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let unshipped = db.sales().get_unshipped().await?;
//! let removed = db.products().delete_by_id(7).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod executor;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, DbError, DbResult};
pub use executor::{DbRow, QueryExecutor, SqlValue, SqliteExecutor};
pub use pool::{Database, DbConfig};

// Store re-exports for convenience
pub use repository::customer::CustomerStore;
pub use repository::product::ProductStore;
pub use repository::sale::SaleStore;
