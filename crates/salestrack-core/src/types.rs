//! # Domain Types
//!
//! The four records the data-access layer reads and writes.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                         │
//! │  │    Customer     │ 1    * │      Sale       │                         │
//! │  │  ─────────────  │───────►│  ─────────────  │                         │
//! │  │  customer_id    │        │  sale_id        │                         │
//! │  │  name, address  │        │  customer_id    │                         │
//! │  └─────────────────┘        │  sale_date      │                         │
//! │                             │  ship_date?     │                         │
//! │                             │  customer_name* │                         │
//! │                             └────────┬────────┘                         │
//! │                                      │ 1                                │
//! │                                      ▼ *                                │
//! │  ┌─────────────────┐        ┌─────────────────┐                         │
//! │  │    Product      │ 1    * │    LineItem     │                         │
//! │  │  ─────────────  │───────►│  ─────────────  │                         │
//! │  │  product_id     │        │  line_item_id   │                         │
//! │  │  price (Money)  │        │  quantity       │                         │
//! │  │  image_name?    │        │  product_name*  │                         │
//! │  └─────────────────┘        │  price*         │                         │
//! │                             └─────────────────┘                         │
//! │                                                                         │
//! │  ? = nullable column     * = denormalized, filled by a join on read    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Identifiers are generated by storage. A record passed to a `create`
//! operation carries an identifier of 0, which is ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who places sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    /// Storage-generated identifier.
    pub customer_id: i64,

    pub name: String,

    pub street_address1: String,

    /// Second address line (suite, apartment). Nullable.
    pub street_address2: Option<String>,

    pub city: String,

    /// Two-letter state code.
    pub state: String,

    pub zip_code: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can appear on line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Storage-generated identifier.
    pub product_id: i64,

    pub name: String,

    pub description: String,

    /// Unit price. Never negative.
    pub price: Money,

    /// File name of the product image, if one exists.
    pub image_name: Option<String>,
}

// =============================================================================
// Shipping Status
// =============================================================================

/// Whether a sale has shipped.
///
/// Derived from the ship date; it is not stored. The only meaningful
/// transition is `Unshipped → Shipped`, but nothing enforces it: an update
/// may set or clear the ship date freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    /// No ship date recorded.
    Unshipped,
    /// Ship date recorded.
    Shipped,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale made to one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Storage-generated identifier.
    pub sale_id: i64,

    /// Owning customer. Must reference an existing customer.
    pub customer_id: i64,

    #[ts(as = "String")]
    pub sale_date: NaiveDate,

    /// `None` means the sale has not shipped yet.
    #[ts(as = "Option<String>")]
    pub ship_date: Option<NaiveDate>,

    /// Customer name, filled in by the join on read. Ignored on write.
    pub customer_name: Option<String>,
}

impl Sale {
    /// Creates an unshipped sale for a customer, ready to pass to `create`.
    pub fn new(customer_id: i64, sale_date: NaiveDate) -> Self {
        Sale {
            sale_id: 0,
            customer_id,
            sale_date,
            ship_date: None,
            customer_name: None,
        }
    }

    /// Returns the shipping status derived from the ship date.
    #[inline]
    pub fn status(&self) -> ShippingStatus {
        match self.ship_date {
            Some(_) => ShippingStatus::Shipped,
            None => ShippingStatus::Unshipped,
        }
    }

    #[inline]
    pub fn is_shipped(&self) -> bool {
        self.ship_date.is_some()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product line on a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Storage-generated identifier.
    pub line_item_id: i64,

    pub sale_id: i64,

    pub product_id: i64,

    /// Number of units. Always positive.
    pub quantity: i64,

    /// Product name from the join on read. Ignored on write.
    pub product_name: Option<String>,

    /// Current product price from the join on read. Ignored on write.
    pub price: Option<Money>,
}

impl LineItem {
    /// Creates a line item ready to pass to `create_line_item`.
    pub fn new(sale_id: i64, product_id: i64, quantity: i64) -> Self {
        LineItem {
            line_item_id: 0,
            sale_id,
            product_id,
            quantity,
            product_name: None,
            price: None,
        }
    }

    /// Returns `price × quantity`, or `None` if the price was not joined in.
    ///
    /// ## Errors
    /// `CoreError::MoneyOverflow` if the product exceeds i64 cents.
    pub fn line_total(&self) -> CoreResult<Option<Money>> {
        self.price
            .map(|p| p.checked_multiply_quantity(self.quantity))
            .transpose()
    }
}

/// Sums the line totals of the items that carry a price.
///
/// ## Errors
/// `CoreError::MoneyOverflow` if any line total or the running sum
/// exceeds i64 cents.
pub fn order_total(items: &[LineItem]) -> CoreResult<Money> {
    items.iter().try_fold(Money::zero(), |total, item| match item.line_total()? {
        Some(line) => total.checked_add(line),
        None => Ok(total),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sale_status_follows_ship_date() {
        let mut sale = Sale::new(1, date(2022, 1, 1));
        assert_eq!(sale.status(), ShippingStatus::Unshipped);
        assert!(!sale.is_shipped());

        sale.ship_date = Some(date(2022, 1, 3));
        assert_eq!(sale.status(), ShippingStatus::Shipped);

        // Clearing the ship date moves it back; nothing prevents that.
        sale.ship_date = None;
        assert_eq!(sale.status(), ShippingStatus::Unshipped);
    }

    #[test]
    fn test_line_total_requires_price() {
        let mut item = LineItem::new(1, 1, 3);
        assert_eq!(item.line_total().unwrap(), None);

        item.price = Some(Money::from_cents(999));
        assert_eq!(item.line_total().unwrap(), Some(Money::from_cents(2997)));
    }

    #[test]
    fn test_line_total_reports_overflow() {
        let mut item = LineItem::new(1, 1, 2);
        item.price = Some(Money::from_cents(i64::MAX / 2));
        assert_eq!(
            item.line_total().unwrap(),
            Some(Money::from_cents(i64::MAX / 2 * 2))
        );

        item.quantity = 3;
        assert!(matches!(
            item.line_total(),
            Err(CoreError::MoneyOverflow { .. })
        ));
    }

    #[test]
    fn test_order_total_reports_overflow_in_sum() {
        let mut a = LineItem::new(1, 1, 1);
        a.price = Some(Money::from_cents(i64::MAX));
        let mut b = LineItem::new(1, 2, 1);
        b.price = Some(Money::from_cents(1));

        assert!(matches!(
            order_total(&[a, b]),
            Err(CoreError::MoneyOverflow { .. })
        ));
    }

    #[test]
    fn test_order_total_skips_unpriced_items() {
        let mut a = LineItem::new(1, 1, 2);
        a.price = Some(Money::from_cents(500));
        let b = LineItem::new(1, 2, 1);
        let mut c = LineItem::new(1, 3, 1);
        c.price = Some(Money::from_cents(199));

        assert_eq!(order_total(&[a, b, c]).unwrap(), Money::from_cents(1199));
        assert_eq!(order_total(&[]).unwrap(), Money::zero());
    }

    #[test]
    fn test_serialization_shape() {
        let mut sale = Sale::new(4, date(2022, 2, 2));
        sale.customer_name = Some("Customer 4".to_string());

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["sale_date"], "2022-02-02");
        assert!(json["ship_date"].is_null());

        let status = serde_json::to_value(ShippingStatus::Unshipped).unwrap();
        assert_eq!(status, "unshipped");

        let product = Product {
            price: Money::from_cents(999),
            ..Default::default()
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 999);
    }
}
