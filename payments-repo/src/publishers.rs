//! Event publisher adapters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use payments_types::{EventPublisher, PaymentEvent, PublishError};

use crate::security::{SIGNATURE_HEADER, WebhookSigner};

/// Wire envelope wrapped around every published event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<'a> {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub data: &'a PaymentEvent,
}

impl<'a> EventEnvelope<'a> {
    pub fn new(event: &'a PaymentEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event.event_type(),
            occurred_at: event.occurred_at(),
            data: event,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing
// ─────────────────────────────────────────────────────────────────────────────

/// Writes each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        info!(
            event_type = event.event_type(),
            payment_id = %event.payment_id(),
            tenant_id = event.tenant_id(),
            payload = %payload,
            "payment event"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

/// Delivers events as signed JSON POSTs to a single endpoint.
pub struct WebhookEventPublisher {
    client: reqwest::Client,
    target_url: String,
    signer: WebhookSigner,
}

impl WebhookEventPublisher {
    /// Creates a publisher whose deliveries give up after `timeout`.
    pub fn new(
        target_url: impl Into<String>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            target_url: target_url.into(),
            signer: WebhookSigner::new(secret),
        })
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl EventPublisher for WebhookEventPublisher {
    #[instrument(skip(self, event), fields(event_type = event.event_type(), payment_id = %event.payment_id()))]
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PublishError> {
        let body = serde_json::to_vec(&EventEnvelope::new(event))
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        let signature = self.signer.sign(Utc::now().timestamp(), &body);

        let response = self
            .client
            .post(&self.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Transport(format!("timed out delivering to {}", self.target_url))
                } else {
                    PublishError::Transport(e.to_string())
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PublishError::Transport(format!(
                "HTTP {}",
                response.status()
            )))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fan-out
// ─────────────────────────────────────────────────────────────────────────────

/// Publishes every event to each inner publisher in order.
///
/// All publishers are attempted; the first error is returned.
#[derive(Default, Clone)]
pub struct FanoutEventPublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl FanoutEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

#[async_trait]
impl EventPublisher for FanoutEventPublisher {
    async fn publish(&self, event: &PaymentEvent) -> Result<(), PublishError> {
        let mut first_error = None;
        for publisher in &self.publishers {
            if let Err(e) = publisher.publish(event).await {
                warn!(error = %e, event_type = event.event_type(), "publisher failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
