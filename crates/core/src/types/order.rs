//! Order types.
//!
//! Orders are created by the backend when checkout is initiated and never
//! deleted; the storefront and admin panel only ever read them. Item
//! prices here are immutable snapshots taken at order creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{OrderId, ProductId, UserId};
use crate::types::price::Price;
use crate::types::status::OrderStatus;

/// One line of an order, snapshotted at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// Price of this line (`unit_price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

/// An order as projected by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    #[must_use]
    pub fn items_total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Whether the recorded total matches the sum of the lines.
    ///
    /// History views assert this; a mismatch means the projection is
    /// corrupt and must not be shown as authoritative.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.items_total() == self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(total_paise: i64) -> Order {
        Order {
            id: OrderId::new("o1"),
            user_id: UserId::new("u1"),
            items: vec![
                OrderItem {
                    product_id: ProductId::new("sandwich"),
                    name: "Veg Sandwich".to_owned(),
                    unit_price: Price::from_paise(5000),
                    quantity: 2,
                },
                OrderItem {
                    product_id: ProductId::new("coffee"),
                    name: "Coffee".to_owned(),
                    unit_price: Price::from_paise(2000),
                    quantity: 1,
                },
            ],
            total_amount: Price::from_paise(total_paise),
            status: OrderStatus::Pending,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn test_items_total() {
        assert_eq!(order(12000).items_total(), Price::from_paise(12000));
    }

    #[test]
    fn test_consistency() {
        assert!(order(12000).is_consistent());
        assert!(!order(11999).is_consistent());
    }
}
