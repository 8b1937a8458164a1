//! In-memory repository tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use payments_types::{
        Amount, Currency, Payment, PaymentId, PaymentRepository, PaymentStatus, ProviderType,
        RepoError,
    };
    use rust_decimal_macros::dec;

    use crate::InMemoryPaymentRepository;

    fn setup_repo() -> InMemoryPaymentRepository {
        InMemoryPaymentRepository::new()
    }

    fn new_payment(tenant: &str, provider: ProviderType, order: &str) -> Payment {
        Payment::create(
            tenant,
            provider,
            Amount::new(dec!(100.00)).unwrap(),
            Currency::usd(),
            order,
            None,
            None,
        )
        .unwrap()
    }

    fn completed_payment(tenant: &str, tx: &str) -> Payment {
        let mut payment = new_payment(tenant, ProviderType::Visanet, "order-c");
        payment.start_processing().unwrap();
        payment.complete(tx, None).unwrap();
        payment
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = setup_repo();
        let mut payment = new_payment("tenant-a", ProviderType::Pagadito, "order-1");

        repo.save(&mut payment).await.unwrap();

        assert_eq!(payment.version(), 1);
        let fetched = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(fetched.id(), payment.id());
        assert_eq!(fetched.order_id(), "order-1");
        assert_eq!(fetched.version(), 1);
        assert!(fetched.uncommitted_events().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let repo = setup_repo();

        let result = repo.find_by_id(PaymentId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_increments_version() {
        let repo = setup_repo();
        let mut payment = new_payment("tenant-a", ProviderType::Paypal, "order-1");
        repo.save(&mut payment).await.unwrap();

        payment.start_processing().unwrap();
        repo.save(&mut payment).await.unwrap();

        assert_eq!(payment.version(), 2);
        let fetched = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(fetched.status(), PaymentStatus::Processing);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let repo = setup_repo();
        let mut payment = completed_payment("tenant-a", "tx-1");
        repo.save(&mut payment).await.unwrap();

        let mut first = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        let mut second = repo.find_by_id(payment.id()).await.unwrap().unwrap();

        first.refund(None, None).unwrap();
        repo.save(&mut first).await.unwrap();

        second.refund(None, None).unwrap();
        let result = repo.save(&mut second).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
        let stored = repo.find_by_id(payment.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), PaymentStatus::Refunded);
        assert_eq!(stored.refunded_amount(), Some(Amount::new(dec!(100)).unwrap()));
    }

    #[tokio::test]
    async fn test_save_after_delete_conflicts() {
        let repo = setup_repo();
        let mut payment = new_payment("tenant-a", ProviderType::Paypal, "order-1");
        repo.save(&mut payment).await.unwrap();

        assert!(repo.delete(payment.id()).await.unwrap());
        payment.start_processing().unwrap();

        let result = repo.save(&mut payment).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_by_transaction_id() {
        let repo = setup_repo();
        let mut payment = completed_payment("tenant-a", "tx-42");
        repo.save(&mut payment).await.unwrap();

        let found = repo.find_by_transaction_id("tx-42").await.unwrap().unwrap();
        assert_eq!(found.id(), payment.id());
        assert!(repo.find_by_transaction_id("tx-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tenant_queries() {
        let repo = setup_repo();
        let mut a1 = new_payment("tenant-a", ProviderType::Pagadito, "order-1");
        let mut a2 = new_payment("tenant-a", ProviderType::Visanet, "order-1");
        let mut b1 = new_payment("tenant-b", ProviderType::Pagadito, "order-2");
        a2.start_processing().unwrap();
        for p in [&mut a1, &mut a2, &mut b1] {
            repo.save(p).await.unwrap();
        }

        assert_eq!(repo.find_by_tenant_id("tenant-a").await.unwrap().len(), 2);
        assert_eq!(repo.find_by_order_id("order-1").await.unwrap().len(), 2);

        let processing = repo
            .find_by_tenant_and_status("tenant-a", PaymentStatus::Processing)
            .await
            .unwrap();
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id(), a2.id());

        let pagadito = repo
            .find_by_tenant_and_provider("tenant-a", ProviderType::Pagadito)
            .await
            .unwrap();
        assert_eq!(pagadito.len(), 1);
        assert_eq!(pagadito[0].id(), a1.id());
    }

    #[tokio::test]
    async fn test_results_are_newest_first() {
        let repo = setup_repo();
        let older = new_payment("tenant-a", ProviderType::Paypal, "order-1");
        let mut snapshot = older.snapshot();
        snapshot.created_at = Utc::now() - Duration::hours(1);
        let mut older = Payment::restore(snapshot);
        let mut newer = new_payment("tenant-a", ProviderType::Paypal, "order-2");
        repo.save(&mut older).await.unwrap();
        repo.save(&mut newer).await.unwrap();

        let payments = repo.find_by_tenant_id("tenant-a").await.unwrap();

        assert_eq!(payments[0].id(), newer.id());
        assert_eq!(payments[1].id(), older.id());
    }

    #[tokio::test]
    async fn test_find_pending_older_than() {
        let repo = setup_repo();
        let mut snapshot = new_payment("tenant-a", ProviderType::Paypal, "order-1").snapshot();
        snapshot.created_at = Utc::now() - Duration::hours(2);
        let mut stale = Payment::restore(snapshot);
        let mut fresh = new_payment("tenant-a", ProviderType::Paypal, "order-2");
        repo.save(&mut stale).await.unwrap();
        repo.save(&mut fresh).await.unwrap();

        let cutoff = Utc::now() - Duration::hours(1);
        let old = repo.find_pending_payments(Some(cutoff)).await.unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].id(), stale.id());

        assert_eq!(repo.find_pending_payments(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_failed_payments() {
        let repo = setup_repo();
        let mut failed = new_payment("tenant-a", ProviderType::Visanet, "order-1");
        failed.start_processing().unwrap();
        failed.fail("card declined", None).unwrap();
        let mut pending = new_payment("tenant-a", ProviderType::Visanet, "order-2");
        repo.save(&mut failed).await.unwrap();
        repo.save(&mut pending).await.unwrap();

        let all = repo.find_failed_payments(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].failure_reason(), Some("card declined"));

        let cutoff = Utc::now() - Duration::hours(1);
        assert!(repo.find_failed_payments(Some(cutoff)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_and_exists() {
        let repo = setup_repo();
        let mut a = new_payment("tenant-a", ProviderType::Paypal, "order-1");
        let mut b = new_payment("tenant-b", ProviderType::Paypal, "order-2");
        b.start_processing().unwrap();
        repo.save(&mut a).await.unwrap();
        repo.save(&mut b).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.count_by_tenant("tenant-a").await.unwrap(), 1);
        assert_eq!(repo.count_by_status(PaymentStatus::Processing).await.unwrap(), 1);
        assert!(repo.exists(a.id()).await.unwrap());

        assert!(repo.delete(a.id()).await.unwrap());
        assert!(!repo.delete(a.id()).await.unwrap());
        assert!(!repo.exists(a.id()).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
