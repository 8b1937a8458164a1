//! External payment processor identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Payment processors a payment can be routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ProviderType {
    Pagadito,
    Visanet,
    Paypal,
}

impl ProviderType {
    pub const ALL: [ProviderType; 3] = [
        ProviderType::Pagadito,
        ProviderType::Visanet,
        ProviderType::Paypal,
    ];

    pub fn pagadito() -> Self {
        ProviderType::Pagadito
    }

    pub fn visanet() -> Self {
        ProviderType::Visanet
    }

    pub fn paypal() -> Self {
        ProviderType::Paypal
    }

    pub fn is_pagadito(&self) -> bool {
        matches!(self, ProviderType::Pagadito)
    }

    pub fn is_visanet(&self) -> bool {
        matches!(self, ProviderType::Visanet)
    }

    pub fn is_paypal(&self) -> bool {
        matches!(self, ProviderType::Paypal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Pagadito => "PAGADITO",
            ProviderType::Visanet => "VISANET",
            ProviderType::Paypal => "PAYPAL",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        ProviderType::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| DomainError::validation(format!("Unknown provider type: {:?}", value)))
    }
}

impl TryFrom<String> for ProviderType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_parse() {
        assert_eq!("PayPal".parse::<ProviderType>().unwrap(), ProviderType::Paypal);
        assert_eq!(" visanet ".parse::<ProviderType>().unwrap(), ProviderType::Visanet);
        assert!("PAGADITO".parse::<ProviderType>().unwrap().is_pagadito());
    }

    #[test]
    fn test_unknown_provider_fails() {
        assert!(matches!(
            "stripe".parse::<ProviderType>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_serde() {
        assert_eq!(
            serde_json::to_string(&ProviderType::Paypal).unwrap(),
            "\"PAYPAL\""
        );
        let parsed: ProviderType = serde_json::from_str("\"pagadito\"").unwrap();
        assert!(parsed.is_pagadito());
        assert!(!parsed.is_paypal());
    }
}
