//! Payment provider gateway ports.
//!
//! A provider is resolved per `(tenant, provider type)`. Refunds are an
//! optional capability: a provider exposes it by returning a `RefundGateway`.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{Amount, Currency, PaymentId, ProviderType};

/// Error type for provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No {provider} provider configured for tenant {tenant_id}")]
    NotConfigured {
        tenant_id: String,
        provider: ProviderType,
    },

    #[error("Provider {0} does not support refunds")]
    UnsupportedOperation(ProviderType),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

/// Refund instruction sent to the processor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRefundRequest {
    pub payment_id: PaymentId,
    pub transaction_id: Option<String>,
    pub amount: Amount,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// What the processor answered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderRefundResponse {
    pub success: bool,
    pub raw: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ProviderRefundResponse {
    pub fn approved(raw: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            raw,
            error: None,
        }
    }

    pub fn declined(error: impl Into<String>, raw: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            raw,
            error: Some(error.into()),
        }
    }
}

/// Refund capability of a provider.
#[async_trait::async_trait]
pub trait RefundGateway: Send + Sync {
    async fn refund_payment(
        &self,
        request: ProviderRefundRequest,
    ) -> Result<ProviderRefundResponse, ProviderError>;
}

/// A configured client for one external processor.
pub trait PaymentProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Returns the refund capability, if this provider has one.
    fn refund_gateway(&self) -> Option<&dyn RefundGateway> {
        None
    }
}

/// Resolves the provider client to use for a tenant.
#[async_trait::async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn resolve(
        &self,
        tenant_id: &str,
        provider_type: ProviderType,
    ) -> Result<Arc<dyn PaymentProvider>, ProviderError>;
}
