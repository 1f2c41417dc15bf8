//! # Query Executor
//!
//! The one capability every store needs: run a parameterized statement.
//!
//! ## Seam
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CustomerStore   ProductStore   SaleStore                             │
//! │         │              │             │                                  │
//! │         └──────────────┼─────────────┘                                  │
//! │                        ▼                                                │
//! │            Arc<dyn QueryExecutor>                                      │
//! │            ├── query(sql, params)   → Vec<DbRow>                       │
//! │            └── execute(sql, params) → rows affected                    │
//! │                        │                                                │
//! │          ┌─────────────┴──────────────┐                                 │
//! │          ▼                            ▼                                 │
//! │    SqliteExecutor               MockQueryExecutor                      │
//! │    (SqlitePool, prod/tests)     (mockall, failure-path tests)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows come back as [`DbRow`], a list of named [`SqlValue`]s. Stores turn
//! them into domain records with explicit decode functions, so nothing
//! outside this file knows about sqlx row types.

use async_trait::async_trait;
use chrono::NaiveDate;
use salestrack_core::Money;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::trace;

use crate::error::{DbError, DbResult};

#[cfg(test)]
use mockall::automock;

/// Storage format for dates in TEXT columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Values
// =============================================================================

/// A single SQL value, used both for bind parameters and result cells.
///
/// The variants mirror SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Storage-class name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Integer(_) => "INTEGER",
            SqlValue::Real(_) => "REAL",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Blob(_) => "BLOB",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

/// Prices are stored as integer cents.
impl From<Money> for SqlValue {
    fn from(v: Money) -> Self {
        SqlValue::Integer(v.cents())
    }
}

/// Dates are stored as ISO-8601 text.
impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Text(v.format(DATE_FORMAT).to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One result row: column names paired with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbRow {
    columns: Vec<(String, SqlValue)>,
}

impl DbRow {
    pub fn new() -> Self {
        DbRow::default()
    }

    /// Appends a column (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the value of a column by name.
    ///
    /// ## Errors
    /// `DbError::Decode` if the row has no such column.
    pub fn get(&self, column: &str) -> DbResult<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| DbError::decode(column, "column not found"))
    }

    pub fn get_i64(&self, column: &str) -> DbResult<i64> {
        self.get_opt_i64(column)?
            .ok_or_else(|| DbError::decode(column, "unexpected NULL"))
    }

    pub fn get_opt_i64(&self, column: &str) -> DbResult<Option<i64>> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v)),
            other => Err(mismatch(column, "INTEGER", other)),
        }
    }

    pub fn get_string(&self, column: &str) -> DbResult<String> {
        self.get_opt_string(column)?
            .ok_or_else(|| DbError::decode(column, "unexpected NULL"))
    }

    pub fn get_opt_string(&self, column: &str) -> DbResult<Option<String>> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(column, "TEXT", other)),
        }
    }

    pub fn get_date(&self, column: &str) -> DbResult<NaiveDate> {
        self.get_opt_date(column)?
            .ok_or_else(|| DbError::decode(column, "unexpected NULL"))
    }

    /// Reads an ISO-8601 (`YYYY-MM-DD`) TEXT column.
    pub fn get_opt_date(&self, column: &str) -> DbResult<Option<NaiveDate>> {
        self.get_opt_string(column)?
            .map(|text| {
                NaiveDate::parse_from_str(&text, DATE_FORMAT)
                    .map_err(|e| DbError::decode(column, format!("invalid date '{text}': {e}")))
            })
            .transpose()
    }

    pub fn get_money(&self, column: &str) -> DbResult<Money> {
        self.get_i64(column).map(Money::from_cents)
    }

    pub fn get_opt_money(&self, column: &str) -> DbResult<Option<Money>> {
        Ok(self.get_opt_i64(column)?.map(Money::from_cents))
    }
}

fn mismatch(column: &str, expected: &str, found: &SqlValue) -> DbError {
    DbError::decode(
        column,
        format!("expected {expected}, found {}", found.type_name()),
    )
}

// =============================================================================
// Executor Trait
// =============================================================================

/// Executes parameterized SQL against some backing store.
///
/// Parameters bind to `?` placeholders in order. Each call is auto-committed
/// on its own; the trait offers no transaction boundary.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a statement that returns rows (SELECT, or INSERT … RETURNING).
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<DbRow>>;

    /// Runs a statement and returns the number of rows it changed.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64>;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

/// [`QueryExecutor`] over a sqlx `SqlitePool`.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteExecutor { pool }
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<DbRow>> {
        trace!(sql = %sql, params = params.len(), "query");

        let rows = bind_params(sql, params).fetch_all(&self.pool).await?;

        rows.iter().map(to_db_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        trace!(sql = %sql, params = params.len(), "execute");

        let result = bind_params(sql, params).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

fn bind_params<'q>(
    sql: &'q str,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, <Sqlite as sqlx::Database>::Arguments<'q>> {
    let mut query = sqlx::query(sql);

    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Blob(v) => query.bind(v.as_slice()),
        };
    }

    query
}

/// Copies a sqlx row into a [`DbRow`], keyed by the value's runtime
/// storage class rather than the declared column type.
fn to_db_row(row: &SqliteRow) -> DbResult<DbRow> {
    let mut out = DbRow::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => SqlValue::Real(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
            }
        };

        out.push(column.name(), value);
    }

    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================
