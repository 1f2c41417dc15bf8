//! # salestrack-core: Domain Types for salestrack
//!
//! Plain records for the four entities the data-access layer moves in and out
//! of the database, plus the `Money` type used for prices.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       salestrack Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation / API layer (not in workspace)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ salestrack-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │ Customer  │  │   Money   │  │   rules   │                  │   │
//! │  │   │ Product   │  │  (cents)  │  │  checks   │                  │   │
//! │  │   │ Sale      │  └───────────┘  └───────────┘                  │   │
//! │  │   │ LineItem  │                                                 │   │
//! │  │   └───────────┘                                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 salestrack-db (Data-Access Layer)               │   │
//! │  │          CustomerStore, ProductStore, SaleStore, migrations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Customer, Product, Sale, LineItem)
//! - [`money`] - Money type with integer arithmetic (no floating point)
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules checked before a write
//!
//! ## Example Usage
//!
//! ```rust
//! use salestrack_core::Money;
//!
//! let price: Money = "9.99".parse().unwrap();
//! assert_eq!(price.cents(), 999);
//! assert_eq!(price.checked_multiply_quantity(3).unwrap().to_string(), "$29.97");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
