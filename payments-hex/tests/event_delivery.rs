//! Event delivery against an unresponsive webhook endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use payments_hex::PaymentService;
use payments_repo::{
    FanoutEventPublisher, InMemoryPaymentRepository, TracingEventPublisher, WebhookEventPublisher,
};
use payments_types::{
    CreatePaymentRequest, PaymentProvider, PaymentRepository, ProviderError, ProviderFactory,
    ProviderType,
};

struct NoRefunds;

impl PaymentProvider for NoRefunds {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Pagadito
    }
}

struct Factory;

#[async_trait]
impl ProviderFactory for Factory {
    async fn resolve(
        &self,
        _tenant_id: &str,
        _provider_type: ProviderType,
    ) -> Result<Arc<dyn PaymentProvider>, ProviderError> {
        Ok(Arc::new(NoRefunds))
    }
}

/// Accepts connections and never answers them.
async fn silent_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/hooks", addr)
}

fn create_request() -> CreatePaymentRequest {
    CreatePaymentRequest {
        provider_type: "PAGADITO".to_string(),
        amount: 12.5,
        currency: "USD".to_string(),
        order_id: "order-9".to_string(),
        external_reference_number: None,
        metadata: None,
    }
}

#[tokio::test]
async fn test_create_returns_when_webhook_client_times_out() {
    let url = silent_endpoint().await;
    let webhooks = WebhookEventPublisher::new(url, "whsec", Duration::from_millis(200)).unwrap();
    let publisher = FanoutEventPublisher::new()
        .with(Arc::new(TracingEventPublisher))
        .with(Arc::new(webhooks));
    let service = PaymentService::new(
        InMemoryPaymentRepository::new(),
        Arc::new(Factory),
        Arc::new(publisher),
    );

    let payment = tokio::time::timeout(
        Duration::from_secs(5),
        service.create_payment("tenant-a", create_request()),
    )
    .await
    .expect("create_payment should not wait on the webhook forever")
    .unwrap();

    assert_eq!(payment.order_id(), "order-9");
    assert_eq!(service.repo().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_returns_when_publish_deadline_passes() {
    let url = silent_endpoint().await;
    // Client deadline far beyond the service's own bound.
    let webhooks = WebhookEventPublisher::new(url, "whsec", Duration::from_secs(300)).unwrap();
    let service = PaymentService::new(
        InMemoryPaymentRepository::new(),
        Arc::new(Factory),
        Arc::new(webhooks),
    )
    .with_publish_timeout(Duration::from_millis(200));

    let payment = tokio::time::timeout(
        Duration::from_secs(5),
        service.create_payment("tenant-a", create_request()),
    )
    .await
    .expect("create_payment should not wait on the webhook forever")
    .unwrap();

    assert!(service.repo().exists(payment.id()).await.unwrap());
}
