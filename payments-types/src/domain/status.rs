//! Payment lifecycle status and its transition graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 7] = [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
        PaymentStatus::PartiallyRefunded,
    ];

    /// Every legal edge of the state machine. If it's not here, it's not allowed.
    pub fn transitions_allowed_from(status: PaymentStatus) -> &'static [PaymentStatus] {
        use PaymentStatus::*;
        match status {
            Pending => &[Processing, Cancelled],
            Processing => &[Completed, Failed, Cancelled],
            Completed => &[Refunded, PartiallyRefunded],
            PartiallyRefunded => &[Refunded],
            Failed | Cancelled | Refunded => &[],
        }
    }

    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        Self::transitions_allowed_from(*self).contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        Self::transitions_allowed_from(*self).is_empty()
    }

    /// A payment with money still held can be refunded; a partially refunded
    /// payment only for its remaining balance.
    pub fn can_be_refunded(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::PartiallyRefunded
        )
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::PartiallyRefunded => "PARTIALLY_REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                DomainError::validation(format!("Unknown payment status: {:?}", value))
            })
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
