//! # Customer Store
//!
//! Database operations for customers.

use std::sync::Arc;

use salestrack_core::validation::validate_customer;
use salestrack_core::Customer;
use tracing::{debug, warn};

use super::{fetch_all, fetch_optional, insert_returning_id};
use crate::error::{DbError, DbResult};
use crate::executor::{DbRow, QueryExecutor, SqlValue};

const CUSTOMER_SELECT: &str = r#"
    SELECT
        customer_id,
        name,
        street_address1,
        street_address2,
        city,
        state,
        zip_code
    FROM customer
"#;

/// Store for customer records.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.customers();
///
/// let created = store.create(&customer).await?;
/// let fetched = store.get_by_id(created.customer_id).await?;
/// ```
#[derive(Clone)]
pub struct CustomerStore {
    executor: Arc<dyn QueryExecutor>,
}

impl CustomerStore {
    /// Creates a new CustomerStore.
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        CustomerStore { executor }
    }

    /// Gets a customer by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - No customer with that ID
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        debug!(id = %id, "Fetching customer");

        let sql = format!("{CUSTOMER_SELECT} WHERE customer_id = ?");
        fetch_optional(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(id)],
            decode_customer,
        )
        .await
    }

    /// Lists every customer, ordered by ID.
    pub async fn get_all(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("{CUSTOMER_SELECT} ORDER BY customer_id");
        let customers = fetch_all(self.executor.as_ref(), &sql, &[], decode_customer).await?;

        debug!(count = customers.len(), "Fetched all customers");
        Ok(customers)
    }

    /// Inserts a customer and returns it as stored.
    ///
    /// The `customer_id` on the input is ignored; storage assigns one.
    ///
    /// ## Errors
    /// * `DbError::IntegrityViolation` - A required field is blank
    pub async fn create(&self, customer: &Customer) -> DbResult<Customer> {
        validate_customer(customer)?;

        debug!(name = %customer.name, "Inserting customer");

        let id = insert_returning_id(
            self.executor.as_ref(),
            r#"
            INSERT INTO customer (
                name, street_address1, street_address2, city, state, zip_code
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING customer_id
            "#,
            &[
                SqlValue::from(customer.name.as_str()),
                SqlValue::from(customer.street_address1.as_str()),
                SqlValue::from(customer.street_address2.clone()),
                SqlValue::from(customer.city.as_str()),
                SqlValue::from(customer.state.as_str()),
                SqlValue::from(customer.zip_code.as_str()),
            ],
            "customer_id",
        )
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Updates every field of an existing customer and returns it as stored.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No customer with `customer.customer_id`
    /// * `DbError::IntegrityViolation` - A required field is blank
    pub async fn update(&self, customer: &Customer) -> DbResult<Customer> {
        validate_customer(customer)?;

        let id = customer.customer_id;
        debug!(id = %id, "Updating customer");

        let changed = self
            .executor
            .execute(
                r#"
                UPDATE customer SET
                    name = ?,
                    street_address1 = ?,
                    street_address2 = ?,
                    city = ?,
                    state = ?,
                    zip_code = ?
                WHERE customer_id = ?
                "#,
                &[
                    SqlValue::from(customer.name.as_str()),
                    SqlValue::from(customer.street_address1.as_str()),
                    SqlValue::from(customer.street_address2.clone()),
                    SqlValue::from(customer.city.as_str()),
                    SqlValue::from(customer.state.as_str()),
                    SqlValue::from(customer.zip_code.as_str()),
                    SqlValue::from(id),
                ],
            )
            .await?;

        if changed == 0 {
            warn!(id = %id, "Customer update matched no rows");
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}

/// Maps a `customer` row to a [`Customer`].
pub fn decode_customer(row: &DbRow) -> DbResult<Customer> {
    Ok(Customer {
        customer_id: row.get_i64("customer_id")?,
        name: row.get_string("name")?,
        street_address1: row.get_string("street_address1")?,
        street_address2: row.get_opt_string("street_address2")?,
        city: row.get_string("city")?,
        state: row.get_string("state")?,
        zip_code: row.get_string("zip_code")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
