//! # Sale Store
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sale Structure                                  │
//! │                                                                         │
//! │  sale (sale_id: 1) ──────────── customer (name joined on read)         │
//! │  ├── customer_id: 1                                                    │
//! │  ├── sale_date: 2022-01-01                                             │
//! │  ├── ship_date: NULL  (unshipped)                                      │
//! │  │                                                                      │
//! │  └── line_item (one per product)                                       │
//! │      ├── line_item_id: 1, product_id: 1, quantity: 1                   │
//! │      ├── line_item_id: 2, product_id: 3, quantity: 1                   │
//! │      └── line_item_id: 3, product_id: 4, quantity: 1                   │
//! │               │                                                         │
//! │               └── product (name, price joined on read)                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every sale read inner-joins `customer`. The schema's foreign key keeps a
//! sale from outliving its customer, so no sale is hidden by the join.

use std::sync::Arc;

use salestrack_core::validation::validate_line_item;
use salestrack_core::{LineItem, Sale};
use tracing::{debug, warn};

use super::{fetch_all, fetch_optional, insert_returning_id};
use crate::error::{DbError, DbResult};
use crate::executor::{DbRow, QueryExecutor, SqlValue};

const SALE_SELECT: &str = r#"
    SELECT
        s.sale_id AS sale_id,
        s.customer_id AS customer_id,
        s.sale_date AS sale_date,
        s.ship_date AS ship_date,
        c.name AS customer_name
    FROM sale s
    INNER JOIN customer c ON c.customer_id = s.customer_id
"#;

const LINE_ITEM_SELECT: &str = r#"
    SELECT
        li.line_item_id AS line_item_id,
        li.sale_id AS sale_id,
        li.product_id AS product_id,
        li.quantity AS quantity,
        p.name AS product_name,
        p.price_cents AS price_cents
    FROM line_item li
    INNER JOIN product p ON p.product_id = li.product_id
"#;

/// Store for sales and line items.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.sales();
///
/// let sale = store.create(&Sale::new(customer_id, today)).await?;
/// store.create_line_item(&LineItem::new(sale.sale_id, product_id, 2)).await?;
///
/// let items = store.get_line_items_by_sale_id(sale.sale_id).await?;
/// let total = salestrack_core::order_total(&items)?;
/// ```
#[derive(Clone)]
pub struct SaleStore {
    executor: Arc<dyn QueryExecutor>,
}

impl SaleStore {
    /// Creates a new SaleStore.
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        SaleStore { executor }
    }

    // =========================================================================
    // Sale Reads
    // =========================================================================

    /// Gets a sale by its ID, with the customer name filled in.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        debug!(id = %id, "Fetching sale");

        let sql = format!("{SALE_SELECT} WHERE s.sale_id = ?");
        fetch_optional(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(id)],
            decode_sale,
        )
        .await
    }

    /// Lists every sale, ordered by ID.
    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SALE_SELECT} ORDER BY s.sale_id");
        let sales = fetch_all(self.executor.as_ref(), &sql, &[], decode_sale).await?;

        debug!(count = sales.len(), "Fetched all sales");
        Ok(sales)
    }

    /// Lists sales with no ship date, ordered by ID.
    pub async fn get_unshipped(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SALE_SELECT} WHERE s.ship_date IS NULL ORDER BY s.sale_id");
        let sales = fetch_all(self.executor.as_ref(), &sql, &[], decode_sale).await?;

        debug!(count = sales.len(), "Fetched unshipped sales");
        Ok(sales)
    }

    /// Lists a customer's sales, ordered by ID.
    pub async fn get_by_customer_id(&self, customer_id: i64) -> DbResult<Vec<Sale>> {
        let sql = format!("{SALE_SELECT} WHERE s.customer_id = ? ORDER BY s.sale_id");
        let sales = fetch_all(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(customer_id)],
            decode_sale,
        )
        .await?;

        debug!(customer_id = %customer_id, count = sales.len(), "Fetched sales for customer");
        Ok(sales)
    }

    /// Lists sales that include a product, ordered by ID.
    ///
    /// One entry per matching line item: a sale with the product on two
    /// lines appears twice.
    pub async fn get_by_product_id(&self, product_id: i64) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "{SALE_SELECT}
            INNER JOIN line_item li ON li.sale_id = s.sale_id
            WHERE li.product_id = ?
            ORDER BY s.sale_id, li.line_item_id"
        );
        let sales = fetch_all(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(product_id)],
            decode_sale,
        )
        .await?;

        debug!(product_id = %product_id, count = sales.len(), "Fetched sales for product");
        Ok(sales)
    }

    // =========================================================================
    // Sale Writes
    // =========================================================================

    /// Inserts a sale and returns it as stored (customer name included).
    ///
    /// The `sale_id` and `customer_name` on the input are ignored.
    ///
    /// ## Errors
    /// * `DbError::IntegrityViolation` - `customer_id` does not exist
    pub async fn create(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(customer_id = %sale.customer_id, sale_date = %sale.sale_date, "Inserting sale");

        let id = insert_returning_id(
            self.executor.as_ref(),
            r#"
            INSERT INTO sale (customer_id, sale_date, ship_date)
            VALUES (?, ?, ?)
            RETURNING sale_id
            "#,
            &[
                SqlValue::from(sale.customer_id),
                SqlValue::from(sale.sale_date),
                SqlValue::from(sale.ship_date),
            ],
            "sale_id",
        )
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Updates customer, sale date and ship date of an existing sale.
    ///
    /// Setting or clearing `ship_date` is how a sale is marked shipped or
    /// unshipped.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No sale with `sale.sale_id`
    /// * `DbError::IntegrityViolation` - `customer_id` does not exist
    pub async fn update(&self, sale: &Sale) -> DbResult<Sale> {
        let id = sale.sale_id;
        debug!(id = %id, status = ?sale.status(), "Updating sale");

        let changed = self
            .executor
            .execute(
                r#"
                UPDATE sale SET
                    customer_id = ?,
                    sale_date = ?,
                    ship_date = ?
                WHERE sale_id = ?
                "#,
                &[
                    SqlValue::from(sale.customer_id),
                    SqlValue::from(sale.sale_date),
                    SqlValue::from(sale.ship_date),
                    SqlValue::from(id),
                ],
            )
            .await?;

        if changed == 0 {
            warn!(id = %id, "Sale update matched no rows");
            return Err(DbError::not_found("Sale", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Deletes a sale and its line items.
    ///
    /// Line items go first, then the sale, as two separately committed
    /// statements.
    ///
    /// ## Returns
    /// Number of sale rows removed: 1 if it existed, 0 otherwise.
    pub async fn delete_by_id(&self, id: i64) -> DbResult<u64> {
        debug!(id = %id, "Deleting sale");

        let line_items = self
            .executor
            .execute(
                "DELETE FROM line_item WHERE sale_id = ?",
                &[SqlValue::from(id)],
            )
            .await?;

        let removed = self
            .executor
            .execute("DELETE FROM sale WHERE sale_id = ?", &[SqlValue::from(id)])
            .await?;

        debug!(id = %id, line_items, removed, "Sale deleted");
        Ok(removed)
    }

    // =========================================================================
    // Line Items
    // =========================================================================

    /// Lists a sale's line items with product name and price, ordered by ID.
    pub async fn get_line_items_by_sale_id(&self, sale_id: i64) -> DbResult<Vec<LineItem>> {
        let sql = format!("{LINE_ITEM_SELECT} WHERE li.sale_id = ? ORDER BY li.line_item_id");
        let items = fetch_all(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(sale_id)],
            decode_line_item,
        )
        .await?;

        debug!(sale_id = %sale_id, count = items.len(), "Fetched line items");
        Ok(items)
    }

    /// Gets a line item by its ID, with product name and price filled in.
    pub async fn get_line_item_by_id(&self, id: i64) -> DbResult<Option<LineItem>> {
        debug!(id = %id, "Fetching line item");

        let sql = format!("{LINE_ITEM_SELECT} WHERE li.line_item_id = ?");
        fetch_optional(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(id)],
            decode_line_item,
        )
        .await
    }

    /// Adds a line item to a sale and returns it as stored.
    ///
    /// ## Errors
    /// * `DbError::IntegrityViolation` - Quantity not positive, or the sale
    ///   or product does not exist
    pub async fn create_line_item(&self, item: &LineItem) -> DbResult<LineItem> {
        validate_line_item(item)?;

        debug!(
            sale_id = %item.sale_id,
            product_id = %item.product_id,
            quantity = %item.quantity,
            "Inserting line item"
        );

        let id = insert_returning_id(
            self.executor.as_ref(),
            r#"
            INSERT INTO line_item (sale_id, product_id, quantity)
            VALUES (?, ?, ?)
            RETURNING line_item_id
            "#,
            &[
                SqlValue::from(item.sale_id),
                SqlValue::from(item.product_id),
                SqlValue::from(item.quantity),
            ],
            "line_item_id",
        )
        .await?;

        self.get_line_item_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))
    }
}

/// Maps a sale row (joined with `customer`) to a [`Sale`].
pub fn decode_sale(row: &DbRow) -> DbResult<Sale> {
    Ok(Sale {
        sale_id: row.get_i64("sale_id")?,
        customer_id: row.get_i64("customer_id")?,
        sale_date: row.get_date("sale_date")?,
        ship_date: row.get_opt_date("ship_date")?,
        customer_name: row.get_opt_string("customer_name")?,
    })
}

/// Maps a line-item row (joined with `product`) to a [`LineItem`].
pub fn decode_line_item(row: &DbRow) -> DbResult<LineItem> {
    Ok(LineItem {
        line_item_id: row.get_i64("line_item_id")?,
        sale_id: row.get_i64("sale_id")?,
        product_id: row.get_i64("product_id")?,
        quantity: row.get_i64("quantity")?,
        product_name: row.get_opt_string("product_name")?,
        price: row.get_opt_money("price_cents")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
