//! Cart types.
//!
//! The cart lives in the canteen backend; these types are the client-side
//! projection the storefront works with. Prices on cart items are
//! display-only; the backend re-prices the cart when an order is created.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::id::ProductId;
use crate::types::price::Price;

/// Cart construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A cart line must hold at least one unit.
    #[error("cart item {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price as last reported by the backend. Display only.
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Create a cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if `quantity` is zero.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(product_id));
        }
        Ok(Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    /// Price of this line (`unit_price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

/// A user's cart, ordered by insertion with quantities aggregated per
/// product by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, paise: i64, quantity: u32) -> CartItem {
        CartItem::new(ProductId::new(id), id, Price::from_paise(paise), quantity).unwrap()
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = CartItem::new(
            ProductId::new("p1"),
            "Veg Sandwich",
            Price::from_paise(5000),
            0,
        )
        .unwrap_err();
        assert_eq!(err, CartError::ZeroQuantity(ProductId::new("p1")));
    }

    #[test]
    fn test_cart_total() {
        // ₹50 × 2 + ₹20 × 1 = ₹120
        let cart = Cart {
            items: vec![item("sandwich", 5000, 2), item("coffee", 2000, 1)],
        };
        assert_eq!(cart.total(), Price::from_paise(12000));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }
}
