//! # Sample Data
//!
//! A small, fixed data set for development databases and store tests.
//!
//! ## Fixture
//! ```text
//! customers   1..=4   "Customer N", City N, state SN
//! products    1..=4   $9.99  $19.99  $29.99  $39.99
//!
//! sale  customer  sale_date   ship_date   line items (product × qty)
//! ────  ────────  ──────────  ──────────  ──────────────────────────
//!  1       1      2022-01-01      -       P1×1  P3×1  P4×1
//!  2       1      2022-02-01  2022-02-02  P1×1
//!  3       2      2022-03-01      -       P1×1
//!  4       3      2022-04-01  2022-04-02  P3×2
//! ```
//!
//! Product 2 is never sold; product 1 appears on three sales; customer 4 has
//! no sales.
//!
//! Everything is inserted through the stores' own `create` operations, so
//! seeding exercises the same path callers use.

use chrono::NaiveDate;
use salestrack_core::{Customer, LineItem, Money, Product, Sale};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Counts of what [`seed_sample_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub sales: usize,
    pub line_items: usize,
}

const SALES: &[(usize, (i32, u32, u32), Option<(i32, u32, u32)>)] = &[
    (0, (2022, 1, 1), None),
    (0, (2022, 2, 1), Some((2022, 2, 2))),
    (1, (2022, 3, 1), None),
    (2, (2022, 4, 1), Some((2022, 4, 2))),
];

/// (sale index, product index, quantity)
const LINE_ITEMS: &[(usize, usize, i64)] = &[
    (0, 0, 1),
    (0, 2, 1),
    (0, 3, 1),
    (1, 0, 1),
    (2, 0, 1),
    (3, 2, 2),
];

/// Inserts the sample data set.
///
/// Returns `Ok(None)` without writing anything if the database already
/// holds customers or products.
pub async fn seed_sample_data(db: &Database) -> DbResult<Option<SeedSummary>> {
    let customers = db.customers();
    let products = db.products();
    let sales = db.sales();

    if !customers.get_all().await?.is_empty() || !products.get_all().await?.is_empty() {
        info!("Database already has data, skipping seed");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();

    let mut customer_ids = Vec::new();
    for n in 1..=4 {
        let created = customers.create(&sample_customer(n)).await?;
        debug!(id = created.customer_id, "Seeded customer");
        customer_ids.push(created.customer_id);
        summary.customers += 1;
    }

    let mut product_ids = Vec::new();
    for n in 1..=4 {
        let created = products.create(&sample_product(n)).await?;
        debug!(id = created.product_id, "Seeded product");
        product_ids.push(created.product_id);
        summary.products += 1;
    }

    let mut sale_ids = Vec::new();
    for &(customer, sale_date, ship_date) in SALES {
        let mut sale = Sale::new(customer_ids[customer], ymd(sale_date)?);
        sale.ship_date = ship_date.map(ymd).transpose()?;

        let created = sales.create(&sale).await?;
        debug!(id = created.sale_id, "Seeded sale");
        sale_ids.push(created.sale_id);
        summary.sales += 1;
    }

    for &(sale, product, quantity) in LINE_ITEMS {
        let item = LineItem::new(sale_ids[sale], product_ids[product], quantity);
        sales.create_line_item(&item).await?;
        summary.line_items += 1;
    }

    info!(
        customers = summary.customers,
        products = summary.products,
        sales = summary.sales,
        line_items = summary.line_items,
        "Sample data seeded"
    );

    Ok(Some(summary))
}

fn sample_customer(n: i64) -> Customer {
    Customer {
        customer_id: 0,
        name: format!("Customer {n}"),
        street_address1: format!("Addr {n}-1"),
        street_address2: (n % 2 == 1).then(|| format!("Addr {n}-2")),
        city: format!("City {n}"),
        state: format!("S{n}"),
        zip_code: n.to_string().repeat(5),
    }
}

fn sample_product(n: i64) -> Product {
    Product {
        product_id: 0,
        name: format!("Product {n}"),
        description: format!("Description {n}"),
        price: Money::from_cents(n * 1000 - 1),
        image_name: (n != 4).then(|| format!("product-{n}.png")),
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> DbResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DbError::Internal(format!("invalid fixture date {y}-{m}-{d}")))
}

/// Fresh in-memory database loaded with the sample data.
#[cfg(test)]
pub(crate) async fn seeded_database() -> Database {
    use crate::pool::DbConfig;

    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed_sample_data(&db).await.unwrap().unwrap();
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_seed_inserts_fixture() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let summary = seed_sample_data(&db).await.unwrap().unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                customers: 4,
                products: 4,
                sales: 4,
                line_items: 6,
            }
        );

        let customer = db.customers().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(customer.name, "Customer 1");
        assert_eq!(customer.street_address2.as_deref(), Some("Addr 1-2"));
        assert_eq!(customer.zip_code, "11111");

        let product = db.products().get_by_id(2).await.unwrap().unwrap();
        assert_eq!(product.price, Money::from_cents(1999));
    }

    #[tokio::test]
    async fn test_seed_refuses_non_empty_database() {
        let db = seeded_database().await;

        assert_eq!(seed_sample_data(&db).await.unwrap(), None);
        assert_eq!(db.customers().get_all().await.unwrap().len(), 4);
    }
}
