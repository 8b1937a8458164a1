//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (InMemory, or a database) will implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{Payment, PaymentId, PaymentStatus, ProviderType};
use crate::error::RepoError;

/// Persistence port for the Payment aggregate.
///
/// `save` MUST reject stale writes: if the stored version differs from
/// `payment.version()`, the adapter returns `RepoError::Conflict` and leaves
/// the stored payment untouched. On success the adapter bumps the version on
/// the passed aggregate.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts or updates a payment by id (optimistic version check).
    async fn save(&self, payment: &mut Payment) -> Result<(), RepoError>;

    /// Removes a payment. Returns false if it did not exist.
    async fn delete(&self, id: PaymentId) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────────

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, RepoError>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Payment>, RepoError>;

    async fn find_by_tenant_id(&self, tenant_id: &str) -> Result<Vec<Payment>, RepoError>;

    async fn find_by_tenant_and_status(
        &self,
        tenant_id: &str,
        status: PaymentStatus,
    ) -> Result<Vec<Payment>, RepoError>;

    async fn find_by_tenant_and_provider(
        &self,
        tenant_id: &str,
        provider_type: ProviderType,
    ) -> Result<Vec<Payment>, RepoError>;

    /// Pending payments, optionally only those created before `older_than`.
    async fn find_pending_payments(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Payment>, RepoError>;

    /// Failed payments, optionally only those that failed before `older_than`.
    async fn find_failed_payments(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Payment>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Existence & counts
    // ─────────────────────────────────────────────────────────────────────────────

    async fn exists(&self, id: PaymentId) -> Result<bool, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_by_tenant(&self, tenant_id: &str) -> Result<u64, RepoError>;

    async fn count_by_status(&self, status: PaymentStatus) -> Result<u64, RepoError>;
}
