//! # Validation Module
//!
//! Field rules checked by the stores before a record is written.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE                                                  │
//! │  ├── Required text fields present                                      │
//! │  ├── Price not negative, quantity positive                             │
//! │  └── Cheap, no round-trip                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints (sale → customer, line item → product)   │
//! │                                                                         │
//! │  Both layers surface to callers as DbError::IntegrityViolation         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use salestrack_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, LineItem, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a `NOT NULL` text field is present and not blank.
///
/// Length and format are not restricted: state names, foreign postal codes
/// and long street lines are all stored as given.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a line-item quantity. Must be positive (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items); negative is not.
///
/// ## Example
/// ```rust
/// use salestrack_core::{validation::validate_price, Money};
///
/// assert!(validate_price(Money::from_cents(999)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the `NOT NULL` columns of a customer. `street_address2` is
/// optional and unchecked.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required("name", &customer.name)?;
    validate_required("street_address1", &customer.street_address1)?;
    validate_required("city", &customer.city)?;
    validate_required("state", &customer.state)?;
    validate_required("zip_code", &customer.zip_code)?;

    Ok(())
}

/// Validates every writable field of a product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required("name", &product.name)?;
    validate_required("description", &product.description)?;
    validate_price(product.price)?;

    Ok(())
}

/// Validates the writable fields of a line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_quantity(item.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
