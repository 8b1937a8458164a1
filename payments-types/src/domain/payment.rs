//! Payment aggregate root.
//!
//! All status changes go through the lifecycle methods below, each of which
//! checks the transition graph before touching any field. A failed call
//! leaves the aggregate exactly as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::events::{
    PaymentCompleted, PaymentEvent, PaymentFailed, PaymentInitiated, PaymentRefunded,
};
use super::{Amount, Currency, PaymentId, PaymentStatus, ProviderType};
use crate::error::DomainError;

/// Free-form payment metadata, ordered by key.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata keys written by the aggregate itself.
pub mod metadata_keys {
    pub const REFUND_REASON: &str = "refundReason";
    pub const REFUND_AMOUNT: &str = "refundAmount";
    pub const COMPLETED_AT: &str = "completedAt";
    pub const FAILED_AT: &str = "failedAt";
    pub const REFUNDED_AT: &str = "refundedAt";
    pub const CANCELLATION_REASON: &str = "cancellationReason";
}

const DEFAULT_CANCEL_REASON: &str = "Payment cancelled";

/// Outcome of validating a refund request against a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundPlan {
    pub amount: Amount,
    pub is_partial_refund: bool,
    pub target_status: PaymentStatus,
}

/// Plain representation of a stored payment, used by adapters to rebuild
/// the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSnapshot {
    pub id: PaymentId,
    pub tenant_id: String,
    pub provider_type: ProviderType,
    pub amount: Amount,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub order_id: String,
    pub transaction_id: Option<String>,
    pub external_reference_number: Option<String>,
    pub metadata: Metadata,
    pub refunded_amount: Option<Amount>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// A single payment and its lifecycle.
#[derive(Debug, Clone)]
pub struct Payment {
    id: PaymentId,
    tenant_id: String,
    provider_type: ProviderType,
    amount: Amount,
    currency: Currency,
    status: PaymentStatus,
    order_id: String,
    transaction_id: Option<String>,
    external_reference_number: Option<String>,
    metadata: Metadata,
    refunded_amount: Option<Amount>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    version: u64,
    events: Vec<PaymentEvent>,
}

impl Payment {
    /// Creates a new pending payment and records `PaymentInitiated`.
    ///
    /// # Validation
    /// - Tenant and order ids cannot be empty
    pub fn create(
        tenant_id: impl Into<String>,
        provider_type: ProviderType,
        amount: Amount,
        currency: Currency,
        order_id: impl Into<String>,
        external_reference_number: Option<String>,
        metadata: Option<Metadata>,
    ) -> Result<Self, DomainError> {
        let tenant_id = tenant_id.into();
        let order_id = order_id.into();
        if tenant_id.trim().is_empty() {
            return Err(DomainError::validation("Tenant id cannot be empty"));
        }
        if order_id.trim().is_empty() {
            return Err(DomainError::validation("Order id cannot be empty"));
        }

        let now = Utc::now();
        let mut payment = Self {
            id: PaymentId::new(),
            tenant_id,
            provider_type,
            amount,
            currency,
            status: PaymentStatus::Pending,
            order_id,
            transaction_id: None,
            external_reference_number,
            metadata: metadata.unwrap_or_default(),
            refunded_amount: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            failed_at: None,
            refunded_at: None,
            version: 0,
            events: Vec::new(),
        };

        payment.record(PaymentEvent::PaymentInitiated(PaymentInitiated {
            payment_id: payment.id,
            tenant_id: payment.tenant_id.clone(),
            provider_type,
            amount,
            currency: payment.currency.clone(),
            order_id: payment.order_id.clone(),
            occurred_at: now,
        }));

        Ok(payment)
    }

    /// Rebuilds a payment from stored state. No events are queued.
    pub fn restore(snapshot: PaymentSnapshot) -> Self {
        Self {
            id: snapshot.id,
            tenant_id: snapshot.tenant_id,
            provider_type: snapshot.provider_type,
            amount: snapshot.amount,
            currency: snapshot.currency,
            status: snapshot.status,
            order_id: snapshot.order_id,
            transaction_id: snapshot.transaction_id,
            external_reference_number: snapshot.external_reference_number,
            metadata: snapshot.metadata,
            refunded_amount: snapshot.refunded_amount,
            failure_reason: snapshot.failure_reason,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            completed_at: snapshot.completed_at,
            failed_at: snapshot.failed_at,
            refunded_at: snapshot.refunded_at,
            version: snapshot.version,
            events: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> PaymentSnapshot {
        PaymentSnapshot {
            id: self.id,
            tenant_id: self.tenant_id.clone(),
            provider_type: self.provider_type,
            amount: self.amount,
            currency: self.currency.clone(),
            status: self.status,
            order_id: self.order_id.clone(),
            transaction_id: self.transaction_id.clone(),
            external_reference_number: self.external_reference_number.clone(),
            metadata: self.metadata.clone(),
            refunded_amount: self.refunded_amount,
            failure_reason: self.failure_reason.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            failed_at: self.failed_at,
            refunded_at: self.refunded_at,
            version: self.version,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Moves a pending payment into processing. Emits no event.
    pub fn start_processing(&mut self) -> Result<(), DomainError> {
        self.ensure_transition(PaymentStatus::Processing)?;
        self.status = PaymentStatus::Processing;
        self.touch();
        Ok(())
    }

    /// Marks the payment as captured by the provider.
    pub fn complete(
        &mut self,
        transaction_id: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<(), DomainError> {
        self.ensure_transition(PaymentStatus::Completed)?;
        let transaction_id = transaction_id.into();
        if transaction_id.trim().is_empty() {
            return Err(DomainError::validation("Transaction id cannot be empty"));
        }

        let now = Utc::now();
        self.status = PaymentStatus::Completed;
        self.transaction_id = Some(transaction_id.clone());
        self.completed_at = Some(now);
        self.merge_metadata(metadata);
        self.metadata.insert(
            metadata_keys::COMPLETED_AT.into(),
            serde_json::Value::String(now.to_rfc3339()),
        );
        self.updated_at = now;

        self.record(PaymentEvent::PaymentCompleted(PaymentCompleted {
            payment_id: self.id,
            tenant_id: self.tenant_id.clone(),
            provider_type: self.provider_type,
            amount: self.amount,
            currency: self.currency.clone(),
            order_id: self.order_id.clone(),
            transaction_id,
            completed_at: now,
        }));
        Ok(())
    }

    /// Marks the payment as rejected by the provider.
    pub fn fail(
        &mut self,
        reason: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<(), DomainError> {
        self.ensure_transition(PaymentStatus::Failed)?;
        let reason = reason.into();

        let now = Utc::now();
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.clone());
        self.failed_at = Some(now);
        self.merge_metadata(metadata);
        self.metadata.insert(
            metadata_keys::FAILED_AT.into(),
            serde_json::Value::String(now.to_rfc3339()),
        );
        self.updated_at = now;

        self.record(PaymentEvent::PaymentFailed(PaymentFailed {
            payment_id: self.id,
            tenant_id: self.tenant_id.clone(),
            provider_type: self.provider_type,
            amount: self.amount,
            currency: self.currency.clone(),
            order_id: self.order_id.clone(),
            failure_reason: reason,
            failed_at: now,
        }));
        Ok(())
    }

    /// Cancels a payment that has not completed yet. Emits no event.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), DomainError> {
        self.ensure_transition(PaymentStatus::Cancelled)?;
        let reason = reason.unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());

        self.status = PaymentStatus::Cancelled;
        self.metadata.insert(
            metadata_keys::CANCELLATION_REASON.into(),
            serde_json::Value::String(reason.clone()),
        );
        self.failure_reason = Some(reason);
        self.touch();
        Ok(())
    }

    /// Balance still available for refunds.
    pub fn refundable_amount(&self) -> Option<Amount> {
        match self.refunded_amount {
            None => Some(self.amount),
            Some(refunded) => self.amount.subtract(&refunded).ok(),
        }
    }

    /// Validates a refund without applying it.
    ///
    /// `amount` defaults to the whole refundable balance. A refund from
    /// `PARTIALLY_REFUNDED` must settle that balance, since the graph has no
    /// `PARTIALLY_REFUNDED -> PARTIALLY_REFUNDED` edge.
    pub fn plan_refund(&self, amount: Option<Amount>) -> Result<RefundPlan, DomainError> {
        let not_refundable = DomainError::IllegalStateTransition {
            from: self.status,
            to: PaymentStatus::Refunded,
        };
        if !self.status.can_be_refunded() {
            return Err(not_refundable);
        }
        let available = self.refundable_amount().ok_or(not_refundable)?;

        let requested = amount.unwrap_or(available);
        if requested > available {
            return Err(DomainError::RefundExceedsAmount {
                requested,
                available,
            });
        }

        let is_partial_refund = requested < available;
        let target_status = if is_partial_refund {
            PaymentStatus::PartiallyRefunded
        } else {
            PaymentStatus::Refunded
        };
        self.ensure_transition(target_status)?;

        Ok(RefundPlan {
            amount: requested,
            is_partial_refund,
            target_status,
        })
    }

    /// Refunds all or part of the payment and records `PaymentRefunded`.
    pub fn refund(
        &mut self,
        amount: Option<Amount>,
        reason: Option<String>,
    ) -> Result<RefundPlan, DomainError> {
        let plan = self.plan_refund(amount)?;
        let refunded_total = match self.refunded_amount {
            Some(previous) => previous.add(&plan.amount)?,
            None => plan.amount,
        };

        let now = Utc::now();
        self.status = plan.target_status;
        self.refunded_amount = Some(refunded_total);
        self.refunded_at = Some(now);
        self.metadata.insert(
            metadata_keys::REFUND_AMOUNT.into(),
            serde_json::Value::String(plan.amount.formatted()),
        );
        if let Some(reason) = reason {
            self.metadata.insert(
                metadata_keys::REFUND_REASON.into(),
                serde_json::Value::String(reason),
            );
        }
        self.metadata.insert(
            metadata_keys::REFUNDED_AT.into(),
            serde_json::Value::String(now.to_rfc3339()),
        );
        self.updated_at = now;

        self.record(PaymentEvent::PaymentRefunded(PaymentRefunded {
            payment_id: self.id,
            tenant_id: self.tenant_id.clone(),
            provider_type: self.provider_type,
            original_amount: self.amount,
            refund_amount: plan.amount,
            currency: self.currency.clone(),
            order_id: self.order_id.clone(),
            transaction_id: self.transaction_id.clone(),
            is_partial_refund: plan.is_partial_refund,
            refunded_at: now,
        }));
        Ok(plan)
    }

    /// Merges `partial` into the metadata. No status change, no event.
    pub fn update_metadata(&mut self, partial: Metadata) {
        self.metadata.extend(partial);
        self.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Event queue
    // ─────────────────────────────────────────────────────────────────────────────

    /// Copy of the events recorded since the last commit.
    pub fn uncommitted_events(&self) -> Vec<PaymentEvent> {
        self.events.clone()
    }

    /// Drains the recorded events.
    pub fn take_events(&mut self) -> Vec<PaymentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mark_events_committed(&mut self) {
        self.events.clear();
    }

    /// Sets the persisted version. Called by repository adapters after a
    /// successful save.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn external_reference_number(&self) -> Option<&str> {
        self.external_reference_number.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn refunded_amount(&self) -> Option<Amount> {
        self.refunded_amount
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn failed_at(&self) -> Option<DateTime<Utc>> {
        self.failed_at
    }

    pub fn refunded_at(&self) -> Option<DateTime<Utc>> {
        self.refunded_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn ensure_transition(&self, target: PaymentStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::IllegalStateTransition {
                from: self.status,
                to: target,
            })
        }
    }

    fn merge_metadata(&mut self, metadata: Option<Metadata>) {
        if let Some(metadata) = metadata {
            self.metadata.extend(metadata);
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn record(&mut self, event: PaymentEvent) {
        self.events.push(event);
    }
}
