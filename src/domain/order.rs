use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One requested (product, quantity) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
}

/// Payload for creating a new order.
///
/// Without an `idempotency_key`, retrying a create that already succeeded
/// persists a second order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub account_id: String,
    pub lines: Vec<OrderLine>,
    pub idempotency_key: Option<String>,
}

/// A line item with the price captured when the order was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// A line item as presented to readers: captured price plus the product's
/// current name and description.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Represents a customer order. The total is always derived from the line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub products: Vec<OrderedProduct>,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

impl NewOrder {
    pub fn new(account_id: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Self {
            account_id: account_id.into(),
            lines,
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl LineItem {
    /// `price × quantity`, or `None` if it does not fit in a `Decimal`.
    pub fn amount(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

impl OrderedProduct {
    pub fn amount(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of line amounts, `None` on overflow.
pub fn checked_total(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount?))
}

impl Order {
    /// Derived from the line items. Orders are rejected at creation when this
    /// would overflow, so a persisted order always has a total.
    pub fn total_price(&self) -> Option<Decimal> {
        checked_total(self.products.iter().map(OrderedProduct::amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_total_is_sum_of_line_amounts() {
        let order = Order {
            id: "o1".into(),
            account_id: "a1".into(),
            created_at: Utc::now(),
            products: vec![
                OrderedProduct {
                    id: "p1".into(),
                    name: "Mug".into(),
                    description: String::new(),
                    price: Decimal::from_str("9.99").unwrap(),
                    quantity: 2,
                },
                OrderedProduct {
                    id: "p2".into(),
                    name: "Tea".into(),
                    description: String::new(),
                    price: Decimal::from_str("0.10").unwrap(),
                    quantity: 3,
                },
            ],
        };
        assert_eq!(order.total_price(), Some(Decimal::from_str("20.28").unwrap()));
    }

    #[test]
    fn test_empty_order_totals_zero() {
        let order = Order {
            id: "o1".into(),
            account_id: "a1".into(),
            created_at: Utc::now(),
            products: Vec::new(),
        };
        assert_eq!(order.total_price(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflowing_amounts_have_no_total() {
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let line = LineItem { product_id: "p1".into(), quantity: 2, price: huge };
        assert_eq!(line.amount(), None);
        assert_eq!(checked_total([Some(huge), Some(huge)]), None);
        assert_eq!(checked_total([Some(huge), Some(Decimal::ONE)]), Some(huge + Decimal::ONE));
    }
}
