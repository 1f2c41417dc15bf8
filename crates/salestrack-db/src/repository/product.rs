//! # Product Store
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Products that were never sold
//! - Cascading delete
//!
//! ## Cascading Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    delete_by_id(product_id)                             │
//! │                                                                         │
//! │  1. DELETE FROM line_item WHERE product_id = ?   (any number of rows)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. DELETE FROM product WHERE product_id = ?     (0 or 1 row)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return rows removed by step 2                                         │
//! │                                                                         │
//! │  Each statement commits on its own. If step 2 fails, the line items    │
//! │  are already gone.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use salestrack_core::validation::validate_product;
use salestrack_core::Product;
use tracing::{debug, warn};

use super::{fetch_all, fetch_optional, insert_returning_id};
use crate::error::{DbError, DbResult};
use crate::executor::{DbRow, QueryExecutor, SqlValue};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.product_id AS product_id,
        p.name AS name,
        p.description AS description,
        p.price_cents AS price_cents,
        p.image_name AS image_name
    FROM product p
"#;

/// Store for product records.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.products();
///
/// let unsold = store.get_all_with_no_sales().await?;
/// let removed = store.delete_by_id(unsold[0].product_id).await?;
/// ```
#[derive(Clone)]
pub struct ProductStore {
    executor: Arc<dyn QueryExecutor>,
}

impl ProductStore {
    /// Creates a new ProductStore.
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        ProductStore { executor }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product with that ID
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        debug!(id = %id, "Fetching product");

        let sql = format!("{PRODUCT_SELECT} WHERE p.product_id = ?");
        fetch_optional(
            self.executor.as_ref(),
            &sql,
            &[SqlValue::from(id)],
            decode_product,
        )
        .await
    }

    /// Lists every product, ordered by ID.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.product_id");
        let products = fetch_all(self.executor.as_ref(), &sql, &[], decode_product).await?;

        debug!(count = products.len(), "Fetched all products");
        Ok(products)
    }

    /// Lists products that appear on no line item, ordered by ID.
    pub async fn get_all_with_no_sales(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT}
            LEFT JOIN line_item li ON li.product_id = p.product_id
            WHERE li.product_id IS NULL
            ORDER BY p.product_id"
        );
        let products = fetch_all(self.executor.as_ref(), &sql, &[], decode_product).await?;

        debug!(count = products.len(), "Fetched products with no sales");
        Ok(products)
    }

    /// Inserts a product and returns it as stored.
    ///
    /// The `product_id` on the input is ignored; storage assigns one.
    ///
    /// ## Errors
    /// * `DbError::IntegrityViolation` - Missing name/description or negative price
    pub async fn create(&self, product: &Product) -> DbResult<Product> {
        validate_product(product)?;

        debug!(name = %product.name, price = %product.price, "Inserting product");

        let id = insert_returning_id(
            self.executor.as_ref(),
            r#"
            INSERT INTO product (name, description, price_cents, image_name)
            VALUES (?, ?, ?, ?)
            RETURNING product_id
            "#,
            &[
                SqlValue::from(product.name.as_str()),
                SqlValue::from(product.description.as_str()),
                SqlValue::from(product.price),
                SqlValue::from(product.image_name.clone()),
            ],
            "product_id",
        )
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Updates every field of an existing product and returns it as stored.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with `product.product_id`
    /// * `DbError::IntegrityViolation` - Missing name/description or negative price
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        validate_product(product)?;

        let id = product.product_id;
        debug!(id = %id, "Updating product");

        let changed = self
            .executor
            .execute(
                r#"
                UPDATE product SET
                    name = ?,
                    description = ?,
                    price_cents = ?,
                    image_name = ?
                WHERE product_id = ?
                "#,
                &[
                    SqlValue::from(product.name.as_str()),
                    SqlValue::from(product.description.as_str()),
                    SqlValue::from(product.price),
                    SqlValue::from(product.image_name.clone()),
                    SqlValue::from(id),
                ],
            )
            .await?;

        if changed == 0 {
            warn!(id = %id, "Product update matched no rows");
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product and every line item that references it.
    ///
    /// ## Returns
    /// Number of product rows removed: 1 if it existed, 0 otherwise.
    pub async fn delete_by_id(&self, id: i64) -> DbResult<u64> {
        debug!(id = %id, "Deleting product");

        let line_items = self
            .executor
            .execute(
                "DELETE FROM line_item WHERE product_id = ?",
                &[SqlValue::from(id)],
            )
            .await?;

        let removed = self
            .executor
            .execute(
                "DELETE FROM product WHERE product_id = ?",
                &[SqlValue::from(id)],
            )
            .await?;

        debug!(id = %id, line_items, removed, "Product deleted");
        Ok(removed)
    }
}

/// Maps a `product` row to a [`Product`].
pub fn decode_product(row: &DbRow) -> DbResult<Product> {
    Ok(Product {
        product_id: row.get_i64("product_id")?,
        name: row.get_string("name")?,
        description: row.get_string("description")?,
        price: row.get_money("price_cents")?,
        image_name: row.get_opt_string("image_name")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MockQueryExecutor;
    use crate::seed::seeded_database;
    use mockall::Sequence;
    use salestrack_core::Money;

    fn new_product() -> Product {
        Product {
            product_id: 0,
            name: "Product 5".to_string(),
            description: "Description 5".to_string(),
            price: Money::from_cents(4999),
            image_name: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = seeded_database().await.products();

        let product = store.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(product.product_id, 1);
        assert_eq!(product.name, "Product 1");
        assert_eq!(product.price, Money::from_cents(999));
        assert_eq!(product.image_name.as_deref(), Some("product-1.png"));

        assert!(store.get_by_id(-1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_is_ordered_by_id() {
        let store = seeded_database().await.products();

        let ids: Vec<i64> = store
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_get_all_with_no_sales() {
        let store = seeded_database().await.products();

        let unsold = store.get_all_with_no_sales().await.unwrap();
        assert_eq!(unsold.len(), 1);
        assert_eq!(unsold[0].product_id, 2);

        let created = store.create(&new_product()).await.unwrap();
        let ids: Vec<i64> = store
            .get_all_with_no_sales()
            .await
            .unwrap()
            .iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(ids, vec![2, created.product_id]);
    }

    #[tokio::test]
    async fn test_create_returns_stored_record() {
        let store = seeded_database().await.products();

        let created = store.create(&new_product()).await.unwrap();
        assert_eq!(created.name, "Product 5");
        assert_eq!(created.price, Money::from_cents(4999));
        assert_eq!(created.image_name, None);

        let fetched = store.get_by_id(created.product_id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let store = seeded_database().await.products();

        let mut input = new_product();
        input.price = Money::from_cents(-100);

        assert!(matches!(
            store.create(&input).await,
            Err(DbError::IntegrityViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_update() {
        let store = seeded_database().await.products();

        let mut product = store.get_by_id(4).await.unwrap().unwrap();
        product.price = "42.50".parse().unwrap();
        product.image_name = Some("product-4-v2.png".to_string());

        let updated = store.update(&product).await.unwrap();
        assert_eq!(updated.price.cents(), 4250);
        assert_eq!(store.get_by_id(4).await.unwrap().unwrap(), product);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = seeded_database().await.products();
        let before = store.get_all().await.unwrap();

        let mut product = new_product();
        product.product_id = 500;

        assert!(matches!(
            store.update(&product).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(store.get_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_product_and_its_line_items() {
        let db = seeded_database().await;
        let products = db.products();
        let sales = db.sales();

        assert_eq!(sales.get_by_product_id(1).await.unwrap().len(), 3);

        assert_eq!(products.delete_by_id(1).await.unwrap(), 1);
        assert!(products.get_by_id(1).await.unwrap().is_none());
        assert!(sales.get_by_product_id(1).await.unwrap().is_empty());

        // Sale 1 keeps its other two lines.
        assert_eq!(sales.get_line_items_by_sale_id(1).await.unwrap().len(), 2);

        assert_eq!(products.delete_by_id(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_id_returns_zero() {
        let store = seeded_database().await.products();

        assert_eq!(store.delete_by_id(-1).await.unwrap(), 0);
        assert_eq!(store.get_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_removes_line_items_before_product() {
        let mut seq = Sequence::new();
        let mut mock = MockQueryExecutor::new();

        mock.expect_execute()
            .withf(|sql, params| {
                sql.starts_with("DELETE FROM line_item") && params == [SqlValue::Integer(3)]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(2));
        mock.expect_execute()
            .withf(|sql, params| {
                sql.starts_with("DELETE FROM product") && params == [SqlValue::Integer(3)]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));

        let store = ProductStore::new(Arc::new(mock));
        assert_eq!(store.delete_by_id(3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_line_item_delete_stops_cascade() {
        let mut mock = MockQueryExecutor::new();
        mock.expect_execute()
            .withf(|sql, _| sql.starts_with("DELETE FROM line_item"))
            .times(1)
            .returning(|_, _| Err(DbError::ConnectionFailed("gone".to_string())));
        mock.expect_execute()
            .withf(|sql, _| sql.starts_with("DELETE FROM product"))
            .never();

        let store = ProductStore::new(Arc::new(mock));
        assert!(matches!(
            store.delete_by_id(3).await,
            Err(DbError::ConnectionFailed(_))
        ));
    }
}
