//! Per-tenant provider resolution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use payments_types::{PaymentProvider, ProviderError, ProviderFactory, ProviderType};

type TenantKey = (String, ProviderType);

/// Holds configured provider clients.
///
/// Resolution order: a client registered for the tenant, then the default
/// client for the provider type.
#[derive(Default)]
pub struct ProviderRegistry {
    defaults: RwLock<HashMap<ProviderType, Arc<dyn PaymentProvider>>>,
    tenants: RwLock<HashMap<TenantKey, Arc<dyn PaymentProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default client for its provider type, replacing any previous one.
    pub async fn register(&self, provider: Arc<dyn PaymentProvider>) {
        self.defaults
            .write()
            .await
            .insert(provider.provider_type(), provider);
    }

    /// Registers a client used only for `tenant_id`.
    pub async fn register_for_tenant(
        &self,
        tenant_id: impl Into<String>,
        provider: Arc<dyn PaymentProvider>,
    ) {
        let key = (tenant_id.into(), provider.provider_type());
        self.tenants.write().await.insert(key, provider);
    }

    /// Provider types with a default client.
    pub async fn configured_types(&self) -> Vec<ProviderType> {
        let defaults = self.defaults.read().await;
        ProviderType::ALL
            .into_iter()
            .filter(|t| defaults.contains_key(t))
            .collect()
    }
}

#[async_trait]
impl ProviderFactory for ProviderRegistry {
    async fn resolve(
        &self,
        tenant_id: &str,
        provider_type: ProviderType,
    ) -> Result<Arc<dyn PaymentProvider>, ProviderError> {
        let key = (tenant_id.to_string(), provider_type);
        if let Some(provider) = self.tenants.read().await.get(&key) {
            debug!(tenant_id, provider = %provider_type, "using tenant provider");
            return Ok(provider.clone());
        }

        self.defaults
            .read()
            .await
            .get(&provider_type)
            .cloned()
            .ok_or_else(|| ProviderError::NotConfigured {
                tenant_id: tenant_id.to_string(),
                provider: provider_type,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(ProviderType);

    impl PaymentProvider for Stub {
        fn provider_type(&self) -> ProviderType {
            self.0
        }
    }

    fn stub(provider_type: ProviderType) -> Arc<Stub> {
        Arc::new(Stub(provider_type))
    }

    #[tokio::test]
    async fn test_resolve_default() {
        let registry = ProviderRegistry::new();
        registry.register(stub(ProviderType::Paypal)).await;

        let provider = registry.resolve("tenant-a", ProviderType::Paypal).await.unwrap();

        assert_eq!(provider.provider_type(), ProviderType::Paypal);
        assert_eq!(registry.configured_types().await, vec![ProviderType::Paypal]);
    }

    #[tokio::test]
    async fn test_tenant_override_wins() {
        let registry = ProviderRegistry::new();
        let default = stub(ProviderType::Visanet);
        let tenant = stub(ProviderType::Visanet);
        registry.register(default.clone()).await;
        registry.register_for_tenant("tenant-b", tenant.clone()).await;

        let for_b = registry.resolve("tenant-b", ProviderType::Visanet).await.unwrap();
        let for_a = registry.resolve("tenant-a", ProviderType::Visanet).await.unwrap();

        let tenant_dyn: Arc<dyn PaymentProvider> = tenant;
        let default_dyn: Arc<dyn PaymentProvider> = default;
        assert!(Arc::ptr_eq(&for_b, &tenant_dyn));
        assert!(Arc::ptr_eq(&for_a, &default_dyn));
    }

    #[tokio::test]
    async fn test_missing_provider_is_not_configured() {
        let registry = ProviderRegistry::new();
        registry.register(stub(ProviderType::Paypal)).await;

        let result = registry.resolve("tenant-a", ProviderType::Pagadito).await;

        match result {
            Err(ProviderError::NotConfigured { tenant_id, provider }) => {
                assert_eq!(tenant_id, "tenant-a");
                assert_eq!(provider, ProviderType::Pagadito);
            }
            _ => panic!("expected NotConfigured"),
        }
    }
}
