//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use payments_types::PaymentRepository;

use super::handlers::{self, AppState};
use super::tenant::tenant_middleware;
use crate::PaymentService;

/// HTTP Server for the Payments API.
pub struct HttpServer<R: PaymentRepository> {
    state: Arc<AppState<R>>,
    metrics: bool,
}

impl<R: PaymentRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: PaymentService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            metrics: true,
        }
    }

    /// Disables the HTTP metrics layer (no global meter provider needed).
    pub fn without_metrics(mut self) -> Self {
        self.metrics = false;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi))
            .route(
                "/api/payments",
                post(handlers::create_payment::<R>).get(handlers::list_payments::<R>),
            )
            .route("/api/payments/{id}", get(handlers::get_payment::<R>))
            .route(
                "/api/payments/{id}/process",
                post(handlers::start_processing::<R>),
            )
            .route(
                "/api/payments/{id}/complete",
                post(handlers::complete_payment::<R>),
            )
            .route("/api/payments/{id}/fail", post(handlers::fail_payment::<R>))
            .route(
                "/api/payments/{id}/cancel",
                post(handlers::cancel_payment::<R>),
            )
            .route(
                "/api/payments/{id}/refund",
                post(handlers::refund_payment::<R>),
            );

        let router = if self.metrics {
            // Uses the globally set MeterProvider
            router.layer(axum_otel_metrics::HttpMetricsLayerBuilder::new().build())
        } else {
            router
        };

        router
            .layer(middleware::from_fn(tenant_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
