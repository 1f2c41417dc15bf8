//! # Error Types
//!
//! Domain-specific error types for salestrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salestrack-core errors (this file)                                    │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  salestrack-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::IntegrityViolation → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A money amount could not be parsed from text.
    #[error("Invalid money amount '{input}': {reason}")]
    InvalidMoney { input: String, reason: String },

    /// Arithmetic on money overflowed i64 cents.
    #[error("Money overflow while computing {operation}")]
    MoneyOverflow { operation: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a record is sent to storage, for the same conditions the
/// schema's `NOT NULL` / `CHECK` constraints would reject.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive (`CHECK (quantity > 0)`).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (`CHECK (price_cents >= 0)`).
    #[error("{field} must not be negative")]
    Negative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of money arithmetic and other fallible domain computations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidMoney {
            input: "9.999".to_string(),
            reason: "at most 2 decimal places".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid money amount '9.999': at most 2 decimal places"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_overflow_message() {
        let err = CoreError::MoneyOverflow {
            operation: "$9.99 x 3".to_string(),
        };
        assert_eq!(err.to_string(), "Money overflow while computing $9.99 x 3");
    }
}
