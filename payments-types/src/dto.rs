//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Amount, Metadata, Payment, PaymentId, PaymentStatus, ProviderType};

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new payment. The tenant comes from the caller's context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[schema(example = "PAGADITO")]
    pub provider_type: String,
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = "USD")]
    pub currency: String,
    #[schema(example = "order-1001")]
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Request to mark a payment as completed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    #[schema(example = "tx-1")]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Request to mark a payment as failed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailPaymentRequest {
    #[schema(example = "card declined")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

/// Request to cancel a payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelPaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Filters for listing a tenant's payments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "COMPLETED")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "PAYPAL")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 50)]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Read projection of a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[schema(value_type = String, example = "01890a5d-ac96-774b-bcce-b302099a8057")]
    pub id: PaymentId,
    pub tenant_id: String,
    #[schema(value_type = String, example = "PAGADITO")]
    pub provider_type: ProviderType,
    #[schema(example = 100.0)]
    pub amount: f64,
    #[schema(example = "USD")]
    pub currency: String,
    #[schema(value_type = String, example = "COMPLETED")]
    pub status: PaymentStatus,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference_number: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id(),
            tenant_id: payment.tenant_id().to_string(),
            provider_type: payment.provider_type(),
            amount: payment.amount().to_f64(),
            currency: payment.currency().to_string(),
            status: payment.status(),
            order_id: payment.order_id().to_string(),
            transaction_id: payment.transaction_id().map(String::from),
            external_reference_number: payment.external_reference_number().map(String::from),
            metadata: payment.metadata().clone(),
            refunded_amount: payment.refunded_amount().map(|a| a.to_f64()),
            failure_reason: payment.failure_reason().map(String::from),
            created_at: payment.created_at(),
            updated_at: payment.updated_at(),
            completed_at: payment.completed_at(),
            failed_at: payment.failed_at(),
            refunded_at: payment.refunded_at(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Refund DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Refund request as received by the refund use case.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub payment_id: String,
    pub tenant_id: String,
    /// Amount to refund; defaults to the whole refundable balance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 40.0)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "customer request")]
    pub reason: Option<String>,
}

/// HTTP body of a refund call; payment and tenant come from the path and headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundPaymentBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 40.0)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of a refund. Failures are reported here, never as errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub payment_id: String,
    #[schema(value_type = String, example = "PARTIALLY_REFUNDED")]
    pub status: PaymentStatus,
    #[schema(example = 40.0)]
    pub refund_amount: f64,
    pub is_partial_refund: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub provider_response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefundResponse {
    pub fn success(
        payment_id: PaymentId,
        status: PaymentStatus,
        refund_amount: Amount,
        is_partial_refund: bool,
        provider_response: Option<serde_json::Value>,
    ) -> Self {
        Self {
            payment_id: payment_id.to_string(),
            status,
            refund_amount: refund_amount.to_f64(),
            is_partial_refund,
            provider_response,
            error: None,
        }
    }

    pub fn failure(payment_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            status: PaymentStatus::Failed,
            refund_amount: 0.0,
            is_partial_refund: false,
            provider_response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
