//! Payment identifier.

use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant};

use crate::error::DomainError;

/// Unique identifier for a Payment.
///
/// Always a UUID v7 with the RFC 4122 variant, so identifiers sort by
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new time-ordered PaymentId.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses and validates a PaymentId from its string form.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("Payment id cannot be empty"));
        }
        let uuid = Uuid::parse_str(value)
            .map_err(|_| DomainError::validation(format!("Invalid payment id: {}", value)))?;
        Self::from_uuid(uuid)
    }

    /// Wraps an existing UUID, rejecting anything that is not v7-shaped.
    pub fn from_uuid(uuid: Uuid) -> Result<Self, DomainError> {
        if uuid.get_version_num() != 7 {
            return Err(DomainError::validation(format!(
                "Payment id must be a UUID v7: {}",
                uuid
            )));
        }
        if uuid.get_variant() != Variant::RFC4122 {
            return Err(DomainError::validation(format!(
                "Payment id has an invalid variant: {}",
                uuid
            )));
        }
        Ok(Self(uuid))
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PaymentId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaymentId> for String {
    fn from(id: PaymentId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_v7() {
        let id = PaymentId::new();
        assert_eq!(id.as_uuid().get_version_num(), 7);
        assert_eq!(PaymentId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_empty_id_fails() {
        assert!(matches!(
            PaymentId::parse("  "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_non_uuid_fails() {
        assert!(PaymentId::parse("payment-123").is_err());
    }

    #[test]
    fn test_v4_uuid_fails() {
        let v4 = Uuid::new_v4().to_string();
        assert!(matches!(
            PaymentId::parse(&v4),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_wrong_variant_fails() {
        // version nibble 7, variant nibble 0 (NCS)
        assert!(PaymentId::parse("01890a5d-ac96-774b-0cb3-b6f8f1e2a3c4").is_err());
        assert!(PaymentId::parse("01890a5d-ac96-774b-8cb3-b6f8f1e2a3c4").is_ok());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let id = PaymentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let bad: Result<PaymentId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(bad.is_err());
    }
}
