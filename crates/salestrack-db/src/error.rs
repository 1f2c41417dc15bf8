//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      ValidationError (salestrack-core)     │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  DbError (this module) ← categorised by kind                           │
//! │       │   ConnectionFailed   - store unreachable                       │
//! │       │   IntegrityViolation - constraint or validation failure        │
//! │       │   NotFound           - update matched zero rows                │
//! │       │   Decode             - row does not match the schema           │
//! │       ▼                                                                 │
//! │  Presentation layer                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads that find nothing are not errors: `get_by_id` returns `Ok(None)`
//! and list queries return an empty `Vec`.

use salestrack_core::ValidationError;
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An update matched no row.
    ///
    /// ## When This Occurs
    /// - `update` called with an identifier that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A write violated a constraint.
    ///
    /// ## When This Occurs
    /// - Sale referencing a non-existent customer (foreign key)
    /// - Line item referencing a non-existent sale or product
    /// - Required column missing (NOT NULL), negative price (CHECK)
    /// - Record rejected by validation before it was sent
    #[error("Data integrity violation: {message}")]
    IntegrityViolation { message: String },

    /// The database could not be reached.
    ///
    /// ## When This Occurs
    /// - Database file can't be opened or created
    /// - Pool closed, or timed out acquiring a connection
    #[error("Unable to connect to database: {0}")]
    ConnectionFailed(String),

    /// A row did not have the shape a decoder expected.
    #[error("Cannot decode column '{column}': {reason}")]
    Decode { column: String, reason: String },

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed for another reason (e.g. SQL syntax).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Decode error for a column.
    pub fn decode(column: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::Decode {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

// SQLite primary result codes that mean the file itself is unusable.
const SQLITE_BUSY: i32 = 5;
const SQLITE_IOERR: i32 = 10;
const SQLITE_CANTOPEN: i32 = 14;

/// True when a driver error says the database can't be reached, as opposed
/// to the statement being wrong.
fn is_unreachable(db_err: &dyn DatabaseError) -> bool {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        // Extended codes carry the primary code in the low byte.
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_IOERR | SQLITE_CANTOPEN))
        .unwrap_or(false)
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (constraint kinds)        → DbError::IntegrityViolation
/// sqlx::Error::Database (BUSY / IOERR / CANTOPEN) → DbError::ConnectionFailed
/// sqlx::Error::Database (other)                   → DbError::QueryFailed
/// PoolTimedOut / PoolClosed / Io / Tls            → DbError::ConnectionFailed
/// ColumnNotFound / ColumnDecode                   → DbError::Decode
/// Other                                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DbError::IntegrityViolation {
                    message: db_err.message().to_string(),
                },
                // SQLite reports some constraint failures without an
                // extended code; the message still says so.
                _ if db_err.message().contains("constraint failed") => {
                    DbError::IntegrityViolation {
                        message: db_err.message().to_string(),
                    }
                }
                _ if is_unreachable(&*db_err) => {
                    DbError::ConnectionFailed(db_err.message().to_string())
                }
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Timed out acquiring a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Configuration(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::ColumnNotFound(column) => DbError::decode(column, "column not found"),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::decode(index, source.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Validation failures surface as the same kind the schema would raise.
impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::IntegrityViolation {
            message: err.to_string(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading [`crate::DbConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;

    /// Driver error carrying a raw SQLite result code.
    #[derive(Debug, Error)]
    #[error("{message}")]
    struct SqliteCodeError {
        code: i32,
        foreign_key: bool,
        message: String,
    }

    impl DatabaseError for SqliteCodeError {
        fn message(&self) -> &str {
            &self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Owned(self.code.to_string()))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.foreign_key {
                ErrorKind::ForeignKeyViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn sqlite_error(code: i32, foreign_key: bool, message: &str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(SqliteCodeError {
            code,
            foreign_key,
            message: message.to_string(),
        }))
    }

    #[test]
    fn test_pool_errors_are_connection_failures() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_io_error_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            DbError::from(sqlx::Error::Io(io)),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_unusable_database_file_is_connection_failure() {
        for (code, message) in [
            (5, "database is locked"),
            (10, "disk I/O error"),
            (14, "unable to open database file"),
            // SQLITE_IOERR_READ, an extended code
            (266, "disk I/O error"),
        ] {
            let err = DbError::from(sqlite_error(code, false, message));
            assert!(
                matches!(err, DbError::ConnectionFailed(ref m) if m == message),
                "code {code} mapped to {err:?}"
            );
        }
    }

    #[test]
    fn test_database_error_categories() {
        let fk = sqlite_error(
            787,
            true,
            "FOREIGN KEY constraint failed",
        );
        assert!(matches!(
            DbError::from(fk),
            DbError::IntegrityViolation { .. }
        ));

        let syntax = sqlite_error(1, false, "near \"SELEC\": syntax error");
        assert!(matches!(DbError::from(syntax), DbError::QueryFailed(_)));
    }

    #[test]
    fn test_missing_column_is_decode_error() {
        let err = DbError::from(sqlx::Error::ColumnNotFound("zip_code".to_string()));
        assert!(matches!(err, DbError::Decode { ref column, .. } if column == "zip_code"));
    }

    #[test]
    fn test_validation_error_is_integrity_violation() {
        let err: DbError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::IntegrityViolation { .. }));
        assert_eq!(err.to_string(), "Data integrity violation: name is required");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            DbError::not_found("Customer", 42).to_string(),
            "Customer not found: 42"
        );
    }
}
