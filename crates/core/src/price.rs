//! Monetary amounts as the catalog expresses them.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Non-negative, finite unit price or total.
///
/// The remote catalog ships plain JSON numbers with no currency, so this stays
/// a number rather than minor units.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub const ZERO: Price = Price(0.0);

    pub fn new(amount: f64) -> DomainResult<Self> {
        if !amount.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(amount))
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    /// Price of `quantity` units.
    pub fn times(self, quantity: u32) -> Price {
        Price(self.0 * f64::from(quantity))
    }
}

impl ValueObject for Price {}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::ops::Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, |acc, p| acc + p)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        assert!(Price::new(-0.5).is_err());
        assert!(Price::new(f64::NAN).is_err());
        assert!(Price::new(f64::INFINITY).is_err());
        assert!(Price::new(0.0).is_ok());
    }

    #[test]
    fn sums_line_amounts() {
        let total: Price = [Price::new(10.0).unwrap().times(2), Price::new(5.0).unwrap().times(1)]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), 25.0);
    }

    #[test]
    fn deserialization_validates() {
        assert_eq!(serde_json::from_str::<Price>("12.5").unwrap().amount(), 12.5);
        assert!(serde_json::from_str::<Price>("-1").is_err());
    }

    #[test]
    fn displays_whole_amounts_without_decimals() {
        assert_eq!(Price::new(1500.0).unwrap().to_string(), "1500");
        assert_eq!(Price::new(12.5).unwrap().to_string(), "12.5");
    }
}
