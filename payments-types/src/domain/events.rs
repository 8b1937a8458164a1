//! Domain events emitted by the Payment aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, Currency, PaymentId, ProviderType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiated {
    pub payment_id: PaymentId,
    pub tenant_id: String,
    pub provider_type: ProviderType,
    pub amount: Amount,
    pub currency: Currency,
    pub order_id: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompleted {
    pub payment_id: PaymentId,
    pub tenant_id: String,
    pub provider_type: ProviderType,
    pub amount: Amount,
    pub currency: Currency,
    pub order_id: String,
    pub transaction_id: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailed {
    pub payment_id: PaymentId,
    pub tenant_id: String,
    pub provider_type: ProviderType,
    pub amount: Amount,
    pub currency: Currency,
    pub order_id: String,
    pub failure_reason: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRefunded {
    pub payment_id: PaymentId,
    pub tenant_id: String,
    pub provider_type: ProviderType,
    pub original_amount: Amount,
    pub refund_amount: Amount,
    pub currency: Currency,
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub is_partial_refund: bool,
    pub refunded_at: DateTime<Utc>,
}

/// A state change of one payment, queued on the aggregate until the change
/// has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentEvent {
    PaymentInitiated(PaymentInitiated),
    PaymentCompleted(PaymentCompleted),
    PaymentFailed(PaymentFailed),
    PaymentRefunded(PaymentRefunded),
}

impl PaymentEvent {
    /// Dotted event name used by publishers (`payment.completed`, ...).
    pub fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentInitiated(_) => "payment.initiated",
            PaymentEvent::PaymentCompleted(_) => "payment.completed",
            PaymentEvent::PaymentFailed(_) => "payment.failed",
            PaymentEvent::PaymentRefunded(_) => "payment.refunded",
        }
    }

    pub fn payment_id(&self) -> PaymentId {
        match self {
            PaymentEvent::PaymentInitiated(e) => e.payment_id,
            PaymentEvent::PaymentCompleted(e) => e.payment_id,
            PaymentEvent::PaymentFailed(e) => e.payment_id,
            PaymentEvent::PaymentRefunded(e) => e.payment_id,
        }
    }

    pub fn tenant_id(&self) -> &str {
        match self {
            PaymentEvent::PaymentInitiated(e) => &e.tenant_id,
            PaymentEvent::PaymentCompleted(e) => &e.tenant_id,
            PaymentEvent::PaymentFailed(e) => &e.tenant_id,
            PaymentEvent::PaymentRefunded(e) => &e.tenant_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PaymentEvent::PaymentInitiated(e) => e.occurred_at,
            PaymentEvent::PaymentCompleted(e) => e.completed_at,
            PaymentEvent::PaymentFailed(e) => e.failed_at,
            PaymentEvent::PaymentRefunded(e) => e.refunded_at,
        }
    }
}
