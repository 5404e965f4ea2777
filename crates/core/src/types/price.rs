//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are held in rupees as a [`Decimal`]. The payment gateway wire
//! format wants minor units (paise), so conversion in both directions is
//! provided; [`Price::to_paise`] is exact or fails, it never rounds.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting a price to gateway minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The rupee amount has sub-paise precision and cannot be transmitted
    /// to the gateway without losing money.
    #[error("amount {0} has sub-paise precision")]
    FractionalPaise(Decimal),

    /// The paise amount does not fit in an `i64`.
    #[error("amount {0} overflows the gateway amount field")]
    Overflow(Decimal),
}

/// A rupee amount.
///
/// Display prices (menu, cart views) come from the backend as plain
/// numbers; authoritative totals are computed server-side and only
/// converted to paise when handed to the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a rupee amount.
    #[must_use]
    pub const fn from_rupees(rupees: Decimal) -> Self {
        Self(rupees)
    }

    /// Create a price from paise (minor units).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// Create a price from a floating-point rupee amount.
    ///
    /// The backend wire format carries prices as JSON numbers. Returns
    /// `None` for non-finite input.
    #[must_use]
    pub fn from_rupees_f64(rupees: f64) -> Option<Self> {
        Decimal::from_f64_retain(rupees).map(Self)
    }

    /// The rupee amount.
    #[must_use]
    pub const fn rupees(&self) -> Decimal {
        self.0
    }

    /// Convert to paise for the payment gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::FractionalPaise`] if the amount is not a
    /// whole number of paise, or [`PriceError::Overflow`] if it does not
    /// fit in an `i64`.
    pub fn to_paise(&self) -> Result<i64, PriceError> {
        let paise = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::Overflow(self.0))?;
        if !paise.fract().is_zero() {
            return Err(PriceError::FractionalPaise(self.0));
        }
        paise.to_i64().ok_or(PriceError::Overflow(self.0))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paise_round_trip() {
        let price = Price::from_paise(12000);
        assert_eq!(price.rupees(), Decimal::new(120, 0));
        assert_eq!(price.to_paise().unwrap(), 12000);
    }

    #[test]
    fn test_line_arithmetic() {
        // ₹50 × 2 + ₹20 × 1 = ₹120 → 12000 paise
        let total = Price::from_paise(5000) * 2 + Price::from_paise(2000) * 1;
        assert_eq!(total, Price::from_paise(12000));
        assert_eq!(total.to_paise().unwrap(), 12000);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_paise(100), Price::from_paise(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_paise(350));
    }

    #[test]
    fn test_fractional_paise_rejected() {
        let price = Price::from_rupees(Decimal::new(10005, 3)); // ₹10.005
        assert_eq!(
            price.to_paise(),
            Err(PriceError::FractionalPaise(Decimal::new(10005, 3)))
        );
    }

    #[test]
    fn test_from_rupees_f64() {
        let price = Price::from_rupees_f64(50.0).unwrap();
        assert_eq!(price.to_paise().unwrap(), 5000);
        assert!(Price::from_rupees_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_paise(12050).to_string(), "₹120.50");
    }
}
