//! Validated monetary quantity.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Largest amount a single payment may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum number of fractional digits.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Currency-agnostic monetary magnitude.
///
/// Always strictly positive, at most 1,000,000 and with at most two
/// fractional digits. Arithmetic returns new validated values, so an
/// operation that would leave the valid range fails exactly like
/// construction does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new Amount.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }
        if value > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "Amount cannot exceed {}",
                MAX_AMOUNT
            )));
        }
        if value.normalize().scale() > MAX_DECIMAL_PLACES {
            return Err(DomainError::validation(format!(
                "Amount cannot have more than {} decimal places",
                MAX_DECIMAL_PLACES
            )));
        }
        Ok(Self(value))
    }

    /// Creates an Amount from a wire-level float.
    ///
    /// Uses the shortest decimal representation that round-trips the float,
    /// so `40.1` becomes `40.1` rather than its binary approximation.
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::validation("Amount must be a finite number"));
        }
        let decimal = Decimal::from_str(&value.to_string())
            .map_err(|_| DomainError::validation(format!("Invalid amount: {}", value)))?;
        Self::new(decimal)
    }

    /// Returns the decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the value as a float for wire formats that need a number.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    pub fn add(&self, other: &Amount) -> Result<Amount, DomainError> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::validation("Amount overflow"))?;
        Amount::new(sum)
    }

    pub fn subtract(&self, other: &Amount) -> Result<Amount, DomainError> {
        Amount::new(self.0 - other.0)
    }

    pub fn multiply(&self, factor: Decimal) -> Result<Amount, DomainError> {
        let product = self
            .0
            .checked_mul(factor)
            .ok_or_else(|| DomainError::validation("Amount overflow"))?;
        Amount::new(product)
    }

    /// Fixed two-decimal representation, e.g. `"100.00"`.
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_creation() {
        let amount = Amount::new(dec!(100.00)).unwrap();
        assert_eq!(amount.value(), dec!(100));
        assert_eq!(amount.formatted(), "100.00");
    }

    #[test]
    fn test_non_positive_amount_fails() {
        assert!(matches!(
            Amount::new(dec!(0)),
            Err(DomainError::Validation(_))
        ));
        assert!(Amount::new(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_upper_bound() {
        assert!(Amount::new(dec!(1000000)).is_ok());
        assert!(Amount::new(dec!(1000000.01)).is_err());
    }

    #[test]
    fn test_precision() {
        assert!(Amount::new(dec!(10.25)).is_ok());
        assert!(Amount::new(dec!(10.250)).is_ok());
        assert!(Amount::new(dec!(10.255)).is_err());
        assert!(Amount::new(dec!(0.001)).is_err());
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Amount::from_f64(40.1).unwrap().value(), dec!(40.1));
        assert_eq!(Amount::from_f64(100.0).unwrap().formatted(), "100.00");
        assert!(Amount::from_f64(1.005).is_err());
        assert!(Amount::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::new(dec!(60)).unwrap();
        let b = Amount::new(dec!(40)).unwrap();

        assert_eq!(a.add(&b).unwrap().value(), dec!(100));
        assert_eq!(a.subtract(&b).unwrap().value(), dec!(20));
        assert_eq!(a.multiply(dec!(1.5)).unwrap().value(), dec!(90));
    }

    #[test]
    fn test_arithmetic_never_produces_invalid_amount() {
        let a = Amount::new(dec!(40)).unwrap();
        let b = Amount::new(dec!(999999)).unwrap();

        assert!(a.subtract(&a).is_err());
        assert!(a.add(&b).is_err());
        assert!(a.multiply(dec!(0.3333)).is_err());
    }

    #[test]
    fn test_amount_display() {
        let amount = Amount::new(dec!(10.5)).unwrap();
        assert_eq!(format!("{}", amount), "10.50");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(ok.value(), dec!(12.5));

        let bad: Result<Amount, _> = serde_json::from_str("\"0\"");
        assert!(bad.is_err());
    }
}
