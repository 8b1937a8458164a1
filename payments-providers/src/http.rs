//! Generic HTTP client for a payment processor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use payments_types::{
    PaymentProvider, ProviderError, ProviderRefundRequest, ProviderRefundResponse, ProviderType,
    RefundGateway,
};

const UNCONFIRMED_MESSAGE: &str = "Provider did not confirm the refund";

/// Provider client talking JSON over HTTP.
///
/// Refunds are sent as `POST {base_url}/refunds`. Only a 2xx answer whose JSON
/// body carries `"success": true` is approved. A 2xx body without that flag,
/// or one that is not JSON, is a decline, as is any other status.
pub struct HttpProviderClient {
    provider_type: ProviderType,
    base_url: String,
    api_key: Option<String>,
    refunds_enabled: bool,
    http: Client,
}

impl HttpProviderClient {
    /// Creates a client with a per-request timeout.
    pub fn new(
        provider_type: ProviderType,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            provider_type,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            refunds_enabled: true,
            http,
        })
    }

    /// Sets the bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Marks the processor as not supporting refunds.
    pub fn without_refunds(mut self) -> Self {
        self.refunds_enabled = false;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(e.to_string())
    }
}

fn error_message(body: Option<&Value>) -> Option<String> {
    let body = body?;
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(String::from)
}

impl PaymentProvider for HttpProviderClient {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn refund_gateway(&self) -> Option<&dyn RefundGateway> {
        if self.refunds_enabled {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl RefundGateway for HttpProviderClient {
    #[instrument(skip(self, request), fields(provider = %self.provider_type, payment_id = %request.payment_id))]
    async fn refund_payment(
        &self,
        request: ProviderRefundRequest,
    ) -> Result<ProviderRefundResponse, ProviderError> {
        let mut req = self
            .http
            .post(format!("{}/refunds", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(map_send_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(map_send_error)?;
        let raw = serde_json::from_str::<Value>(&body).ok();
        debug!(status = status.as_u16(), "provider answered refund");

        if !status.is_success() {
            let message =
                error_message(raw.as_ref()).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Ok(ProviderRefundResponse::declined(message, raw));
        }

        match raw.as_ref().and_then(|v| v.get("success")).and_then(Value::as_bool) {
            Some(true) => Ok(ProviderRefundResponse::approved(raw)),
            Some(false) => {
                let message = error_message(raw.as_ref())
                    .unwrap_or_else(|| "Refund declined by provider".to_string());
                Ok(ProviderRefundResponse::declined(message, raw))
            }
            None => {
                warn!(status = status.as_u16(), "provider answer carries no success flag");
                Ok(ProviderRefundResponse::declined(UNCONFIRMED_MESSAGE, raw))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use payments_types::{Amount, Currency, PaymentId};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn client(base_url: &str) -> HttpProviderClient {
        HttpProviderClient::new(ProviderType::Visanet, base_url, Duration::from_secs(5)).unwrap()
    }

    fn refund_request() -> ProviderRefundRequest {
        ProviderRefundRequest {
            payment_id: PaymentId::new(),
            transaction_id: Some("tx-1".to_string()),
            amount: Amount::new(dec!(40.00)).unwrap(),
            currency: Currency::usd(),
            reason: Some("customer request".to_string()),
        }
    }

    async fn spawn_processor(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/refunds",
            post(move |headers: HeaderMap, Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    let mut body = body;
                    body["echo"] = request;
                    body["authorization"] = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(Value::from)
                        .unwrap_or(Value::Null);
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = client("http://localhost:9000/");
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_refund_capability_can_be_disabled() {
        let enabled = client("http://localhost:9000");
        assert!(enabled.refund_gateway().is_some());

        let disabled = client("http://localhost:9000").without_refunds();
        assert!(disabled.refund_gateway().is_none());
        assert_eq!(disabled.provider_type(), ProviderType::Visanet);
    }

    #[tokio::test]
    async fn test_refund_approved() {
        let url = spawn_processor(StatusCode::OK, json!({ "success": true, "id": "rf_1" })).await;
        let client = client(&url).with_api_key("sk_test");

        let response = client.refund_payment(refund_request()).await.unwrap();

        assert!(response.success);
        let raw = response.raw.unwrap();
        assert_eq!(raw["id"], "rf_1");
        assert_eq!(raw["authorization"], "Bearer sk_test");
        assert_eq!(raw["echo"]["transactionId"], "tx-1");
        assert_eq!(raw["echo"]["reason"], "customer request");
    }

    #[tokio::test]
    async fn test_refund_declined_in_body() {
        let url = spawn_processor(
            StatusCode::OK,
            json!({ "success": false, "error": "gateway timeout" }),
        )
        .await;

        let response = client(&url).refund_payment(refund_request()).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("gateway timeout"));
    }

    #[tokio::test]
    async fn test_refund_without_success_flag_is_decline() {
        let url = spawn_processor(StatusCode::OK, json!({ "id": "rf_2" })).await;

        let response = client(&url).refund_payment(refund_request()).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some(UNCONFIRMED_MESSAGE));
        assert_eq!(response.raw.unwrap()["id"], "rf_2");
    }

    #[tokio::test]
    async fn test_refund_non_json_success_is_decline() {
        let app = Router::new().route("/refunds", post(|| async { "OK" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let response = client(&format!("http://{}", addr))
            .refund_payment(refund_request())
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.raw.is_none());
        assert_eq!(response.error.as_deref(), Some(UNCONFIRMED_MESSAGE));
    }

    #[tokio::test]
    async fn test_refund_http_error_is_decline() {
        let url = spawn_processor(StatusCode::BAD_GATEWAY, json!({})).await;

        let response = client(&url).refund_payment(refund_request()).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("HTTP 502"));
    }

    #[tokio::test]
    async fn test_unreachable_processor_is_transport_error() {
        let client = client("http://127.0.0.1:1");

        let result = client.refund_payment(refund_request()).await;

        assert!(matches!(result, Err(ProviderError::Transport(_))));
    }
}
