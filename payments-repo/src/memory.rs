//! In-memory repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use payments_types::{Payment, PaymentId, PaymentRepository, PaymentStatus, ProviderType, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// In-memory Repository
// ─────────────────────────────────────────────────────────────────────────────

/// Payment repository backed by a concurrent map.
///
/// Writes are version-checked per entry, so two executions that loaded the
/// same payment cannot both save it.
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: DashMap<PaymentId, Payment>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, predicate: F) -> Vec<Payment>
    where
        F: Fn(&Payment) -> bool,
    {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        payments
    }

    fn count_where<F>(&self, predicate: F) -> u64
    where
        F: Fn(&Payment) -> bool,
    {
        self.payments
            .iter()
            .filter(|entry| predicate(entry.value()))
            .count() as u64
    }
}

/// Stored copies never carry queued events.
fn stored_copy(payment: &Payment) -> Payment {
    let mut stored = payment.clone();
    stored.mark_events_committed();
    stored
}

fn is_before(at: DateTime<Utc>, cutoff: Option<DateTime<Utc>>) -> bool {
    cutoff.is_none_or(|cutoff| at < cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &mut Payment) -> Result<(), RepoError> {
        match self.payments.entry(payment.id()) {
            Entry::Occupied(mut entry) => {
                let stored_version = entry.get().version();
                if stored_version != payment.version() {
                    return Err(RepoError::Conflict(format!(
                        "payment {} was modified concurrently (stored version {}, given {})",
                        payment.id(),
                        stored_version,
                        payment.version()
                    )));
                }
                payment.set_version(stored_version + 1);
                entry.insert(stored_copy(payment));
            }
            Entry::Vacant(entry) => {
                if payment.version() != 0 {
                    return Err(RepoError::Conflict(format!(
                        "payment {} no longer exists",
                        payment.id()
                    )));
                }
                payment.set_version(1);
                entry.insert(stored_copy(payment));
            }
        }
        Ok(())
    }

    async fn delete(&self, id: PaymentId) -> Result<bool, RepoError> {
        Ok(self.payments.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        Ok(self.payments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        Ok(self
            .payments
            .iter()
            .find(|entry| entry.value().transaction_id() == Some(transaction_id))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| p.order_id() == order_id))
    }

    async fn find_by_tenant_id(&self, tenant_id: &str) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| p.tenant_id() == tenant_id))
    }

    async fn find_by_tenant_and_status(
        &self,
        tenant_id: &str,
        status: PaymentStatus,
    ) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| p.tenant_id() == tenant_id && p.status() == status))
    }

    async fn find_by_tenant_and_provider(
        &self,
        tenant_id: &str,
        provider_type: ProviderType,
    ) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| p.tenant_id() == tenant_id && p.provider_type() == provider_type))
    }

    async fn find_pending_payments(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| {
            p.status() == PaymentStatus::Pending && is_before(p.created_at(), older_than)
        }))
    }

    async fn find_failed_payments(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Payment>, RepoError> {
        Ok(self.collect(|p| {
            p.status() == PaymentStatus::Failed
                && is_before(p.failed_at().unwrap_or(p.updated_at()), older_than)
        }))
    }

    async fn exists(&self, id: PaymentId) -> Result<bool, RepoError> {
        Ok(self.payments.contains_key(&id))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.payments.len() as u64)
    }

    async fn count_by_tenant(&self, tenant_id: &str) -> Result<u64, RepoError> {
        Ok(self.count_where(|p| p.tenant_id() == tenant_id))
    }

    async fn count_by_status(&self, status: PaymentStatus) -> Result<u64, RepoError> {
        Ok(self.count_where(|p| p.status() == status))
    }
}
