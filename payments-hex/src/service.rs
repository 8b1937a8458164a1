//! Payment Application Service
//!
//! Orchestrates the payment aggregate through the repository, provider and
//! publisher ports. Each operation runs load, validate, mutate, persist,
//! publish in that order on a single aggregate instance.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use payments_types::{
    Amount, AppError, CancelPaymentRequest, CompletePaymentRequest, CreatePaymentRequest,
    Currency, EventPublisher, FailPaymentRequest, ListPaymentsQuery, Payment, PaymentId,
    PaymentRepository, PaymentStatus, ProviderError, ProviderFactory, ProviderRefundRequest,
    ProviderType, RefundRequest, RefundResponse,
};

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: usize = 500;

/// Longest wait for a single event publication before giving up on it.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_DECLINE_MESSAGE: &str = "Refund declined by provider";

/// Application service for payment operations.
///
/// Generic over `R: PaymentRepository`; providers and publishers are trait
/// objects since they are chosen from configuration at startup.
pub struct PaymentService<R: PaymentRepository> {
    repo: R,
    providers: Arc<dyn ProviderFactory>,
    publisher: Arc<dyn EventPublisher>,
    publish_timeout: Duration,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(
        repo: R,
        providers: Arc<dyn ProviderFactory>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repo,
            providers,
            publisher,
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Bounds how long a use case waits on each event publication.
    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refunds
    // ─────────────────────────────────────────────────────────────────────────────

    /// Refunds all or part of a payment through its provider.
    ///
    /// Never fails: every problem is reported in the returned
    /// `RefundResponse` with status `FAILED` and a zero refund amount.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id, tenant_id = %request.tenant_id))]
    pub async fn refund_payment(&self, request: RefundRequest) -> RefundResponse {
        let payment_id = request.payment_id.clone();
        match self.try_refund(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "refund failed");
                RefundResponse::failure(payment_id, err.to_string())
            }
        }
    }

    async fn try_refund(&self, request: RefundRequest) -> Result<RefundResponse, AppError> {
        let payment_id = PaymentId::parse(&request.payment_id)?;
        let mut payment = self.load_for_tenant(&request.tenant_id, payment_id).await?;

        if !payment.status().can_be_refunded() {
            return Err(AppError::IllegalStateTransition(format!(
                "Payment in status {} cannot be refunded",
                payment.status()
            )));
        }

        let requested = request.amount.map(Amount::from_f64).transpose()?;
        let plan = payment.plan_refund(requested)?;

        let provider_type = payment.provider_type();
        let provider = self
            .providers
            .resolve(payment.tenant_id(), provider_type)
            .await?;
        let gateway = provider
            .refund_gateway()
            .ok_or(ProviderError::UnsupportedOperation(provider_type))?;

        let answer = gateway
            .refund_payment(ProviderRefundRequest {
                payment_id,
                transaction_id: payment.transaction_id().map(String::from),
                amount: plan.amount,
                currency: payment.currency().clone(),
                reason: request.reason.clone(),
            })
            .await?;

        if !answer.success {
            let message = answer
                .error
                .unwrap_or_else(|| DEFAULT_DECLINE_MESSAGE.to_string());
            warn!(provider = %provider_type, error = %message, "provider declined refund");
            return Ok(RefundResponse::failure(payment_id.to_string(), message));
        }

        let applied = payment.refund(Some(plan.amount), request.reason)?;
        self.persist(&mut payment).await?;

        info!(
            amount = %applied.amount,
            partial = applied.is_partial_refund,
            status = %payment.status(),
            "payment refunded"
        );
        Ok(RefundResponse::success(
            payment_id,
            payment.status(),
            applied.amount,
            applied.is_partial_refund,
            answer.raw,
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a tenant's payment. Payments of other tenants are reported as not found.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, tenant_id: &str, id: PaymentId) -> Result<Payment, AppError> {
        self.load_for_tenant(tenant_id, id).await
    }

    /// Lists a tenant's payments, newest first.
    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        tenant_id: &str,
        query: ListPaymentsQuery,
    ) -> Result<Vec<Payment>, AppError> {
        let status = query
            .status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?;
        let provider = query
            .provider
            .as_deref()
            .map(str::parse::<ProviderType>)
            .transpose()?;

        let mut payments = match (status, provider) {
            (Some(status), _) => self.repo.find_by_tenant_and_status(tenant_id, status).await?,
            (None, Some(provider)) => {
                self.repo
                    .find_by_tenant_and_provider(tenant_id, provider)
                    .await?
            }
            (None, None) => self.repo.find_by_tenant_id(tenant_id).await?,
        };

        payments.retain(|p| {
            provider.is_none_or(|provider| p.provider_type() == provider)
                && query
                    .order_id
                    .as_deref()
                    .is_none_or(|order_id| p.order_id() == order_id)
        });
        payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        Ok(payments
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(limit)
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle commands
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a pending payment for the tenant.
    #[instrument(skip(self, req), fields(order_id = %req.order_id, provider = %req.provider_type))]
    pub async fn create_payment(
        &self,
        tenant_id: &str,
        req: CreatePaymentRequest,
    ) -> Result<Payment, AppError> {
        let provider_type: ProviderType = req.provider_type.parse()?;
        let amount = Amount::from_f64(req.amount)?;
        let currency = Currency::new(&req.currency)?;

        let mut payment = Payment::create(
            tenant_id,
            provider_type,
            amount,
            currency,
            req.order_id,
            req.external_reference_number,
            req.metadata,
        )?;
        self.persist(&mut payment).await?;

        info!(payment_id = %payment.id(), "payment created");
        Ok(payment)
    }

    /// Moves a pending payment into processing.
    #[instrument(skip(self))]
    pub async fn start_processing(
        &self,
        tenant_id: &str,
        id: PaymentId,
    ) -> Result<Payment, AppError> {
        let mut payment = self.load_for_tenant(tenant_id, id).await?;
        payment.start_processing()?;
        self.persist(&mut payment).await?;

        info!("payment processing");
        Ok(payment)
    }

    /// Records the provider's capture of a payment.
    #[instrument(skip(self, req), fields(transaction_id = %req.transaction_id))]
    pub async fn complete_payment(
        &self,
        tenant_id: &str,
        id: PaymentId,
        req: CompletePaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut payment = self.load_for_tenant(tenant_id, id).await?;
        payment.complete(req.transaction_id, req.metadata)?;
        self.persist(&mut payment).await?;

        info!("payment completed");
        Ok(payment)
    }

    /// Records a provider rejection.
    #[instrument(skip(self, req))]
    pub async fn fail_payment(
        &self,
        tenant_id: &str,
        id: PaymentId,
        req: FailPaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut payment = self.load_for_tenant(tenant_id, id).await?;
        payment.fail(req.reason, req.metadata)?;
        self.persist(&mut payment).await?;

        info!(reason = payment.failure_reason().unwrap_or_default(), "payment failed");
        Ok(payment)
    }

    #[instrument(skip(self, req))]
    pub async fn cancel_payment(
        &self,
        tenant_id: &str,
        id: PaymentId,
        req: CancelPaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut payment = self.load_for_tenant(tenant_id, id).await?;
        payment.cancel(req.reason)?;
        self.persist(&mut payment).await?;

        info!("payment cancelled");
        Ok(payment)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn load_for_tenant(&self, tenant_id: &str, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|p| p.tenant_id() == tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("Payment {}", id)))
    }

    /// Saves the aggregate, then publishes its queued events in order.
    ///
    /// Publish failures and timeouts are logged; the state change is already
    /// stored.
    async fn persist(&self, payment: &mut Payment) -> Result<(), AppError> {
        self.repo.save(payment).await?;

        for event in payment.uncommitted_events() {
            let published =
                tokio::time::timeout(self.publish_timeout, self.publisher.publish(&event)).await;
            match published {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    error = %e,
                    event_type = event.event_type(),
                    payment_id = %payment.id(),
                    "failed to publish payment event"
                ),
                Err(_) => warn!(
                    timeout_ms = self.publish_timeout.as_millis() as u64,
                    event_type = event.event_type(),
                    payment_id = %payment.id(),
                    "timed out publishing payment event"
                ),
            }
        }
        payment.mark_events_committed();
        Ok(())
    }
}
