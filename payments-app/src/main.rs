//! # Payments Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Register provider clients and event publishers
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payments_hex::{PaymentService, inbound::HttpServer};
use payments_providers::{HttpProviderClient, ProviderRegistry};
use payments_repo::{FanoutEventPublisher, TracingEventPublisher, WebhookEventPublisher, build_repo};

use config::Config;

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("payments-service"), provider))
}

async fn build_providers(config: &Config) -> anyhow::Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();
    for provider in &config.providers {
        let mut client = HttpProviderClient::new(
            provider.provider_type,
            provider.base_url.clone(),
            config.provider_timeout,
        )?;
        if let Some(key) = &provider.api_key {
            client = client.with_api_key(key.clone());
        }
        if !provider.refunds {
            client = client.without_refunds();
        }
        tracing::info!(
            provider = %provider.provider_type,
            url = %provider.base_url,
            refunds = provider.refunds,
            "registered payment provider"
        );
        registry.register(Arc::new(client)).await;
    }
    Ok(registry)
}

fn build_publisher(config: &Config) -> anyhow::Result<FanoutEventPublisher> {
    let publisher = FanoutEventPublisher::new().with(Arc::new(TracingEventPublisher));
    match &config.webhook {
        Some(webhook) => {
            tracing::info!(url = %webhook.url, timeout = ?webhook.timeout, "webhook delivery enabled");
            let webhooks = WebhookEventPublisher::new(
                webhook.url.clone(),
                webhook.secret.clone(),
                webhook.timeout,
            )?;
            Ok(publisher.with(Arc::new(webhooks)))
        }
        None => Ok(publisher),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize OpenTelemetry tracing when an OTLP collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payments_app=debug,payments_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting payments server on port {}", config.port);

    let providers = build_providers(&config).await?;
    if providers.configured_types().await.is_empty() {
        tracing::warn!("No payment providers configured; refunds will fail");
    }
    let publisher = build_publisher(&config)?;

    // Create the payment service
    let service = PaymentService::new(build_repo(), Arc::new(providers), Arc::new(publisher))
        .with_publish_timeout(config.publish_timeout);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
