//! Currency code value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// ISO 4217-style currency code.
///
/// String-backed and normalised to upper case; only the syntax (three ASCII
/// letters) is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parses a currency code from free-form input (trimmed, case-insensitive).
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "Invalid currency code: {:?}",
                code
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the upper-case code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_is_normalised() {
        let currency = Currency::new(" usd ").unwrap();
        assert_eq!(currency.code(), "USD");
        assert_eq!(currency, Currency::usd());
    }

    #[test]
    fn test_invalid_currency_fails() {
        for code in ["", "US", "USDT", "U$D", "12A"] {
            assert!(
                matches!(Currency::new(code), Err(DomainError::Validation(_))),
                "{:?} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_currency_parse() {
        let currency: Currency = "gtq".parse().unwrap();
        assert_eq!(currency.to_string(), "GTQ");
    }
}
