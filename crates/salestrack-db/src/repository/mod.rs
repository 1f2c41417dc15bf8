//! # Store Module
//!
//! Typed CRUD access for each entity family.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.sales().get_by_customer_id(1)                              │
//! │       ▼                                                                 │
//! │  SaleStore                                                             │
//! │  ├── SQL text + bind parameters (SqlValue)                             │
//! │  └── decode_sale(&DbRow) → Sale                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Arc<dyn QueryExecutor>                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores are leaves: none calls another. Writes follow one lifecycle:
//! validate, insert or update, then re-fetch by identifier and return the
//! stored row.
//!
//! ## Available Stores
//!
//! - [`CustomerStore`](customer::CustomerStore) - Customer CRUD
//! - [`ProductStore`](product::ProductStore) - Product CRUD, unsold report, cascading delete
//! - [`SaleStore`](sale::SaleStore) - Sales and their line items

pub mod customer;
pub mod product;
pub mod sale;

use crate::error::{DbError, DbResult};
use crate::executor::{DbRow, QueryExecutor, SqlValue};

/// Runs a query expected to match at most one row and decodes it.
pub(crate) async fn fetch_optional<T>(
    executor: &dyn QueryExecutor,
    sql: &str,
    params: &[SqlValue],
    decode: fn(&DbRow) -> DbResult<T>,
) -> DbResult<Option<T>> {
    let rows = executor.query(sql, params).await?;
    rows.first().map(decode).transpose()
}

/// Runs a query and decodes every row.
pub(crate) async fn fetch_all<T>(
    executor: &dyn QueryExecutor,
    sql: &str,
    params: &[SqlValue],
    decode: fn(&DbRow) -> DbResult<T>,
) -> DbResult<Vec<T>> {
    let rows = executor.query(sql, params).await?;
    rows.iter().map(decode).collect()
}

/// Runs an `INSERT … RETURNING <id_column>` and returns the generated id.
pub(crate) async fn insert_returning_id(
    executor: &dyn QueryExecutor,
    sql: &str,
    params: &[SqlValue],
    id_column: &str,
) -> DbResult<i64> {
    let rows = executor.query(sql, params).await?;
    let row = rows
        .first()
        .ok_or_else(|| DbError::Internal(format!("insert returned no {id_column}")))?;
    row.get_i64(id_column)
}
