//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;

use payments_types::ProviderType;

/// Connection settings for one payment processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub base_url: String,
    pub api_key: Option<String>,
    pub refunds: bool,
}

/// Outbound webhook delivery target.
#[derive(Clone, PartialEq)]
pub struct WebhookConfig {
    pub url: String,
    pub secret: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub provider_timeout: Duration,
    pub publish_timeout: Duration,
    pub providers: Vec<ProviderConfig>,
    pub webhook: Option<WebhookConfig>,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a port number")?;

        let seconds = |key: &str, default: u64| -> anyhow::Result<Duration> {
            match var(key) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{key} must be a whole number of seconds")),
                None => Ok(Duration::from_secs(default)),
            }
        };
        let provider_timeout = seconds("PROVIDER_TIMEOUT_SECS", 30)?;
        let publish_timeout = seconds("EVENT_PUBLISH_TIMEOUT_SECS", 10)?;

        let mut providers = Vec::new();
        for provider_type in ProviderType::ALL {
            let prefix = format!("PROVIDER_{}", provider_type.as_str());
            let Some(base_url) = var(&format!("{prefix}_URL")) else {
                continue;
            };
            let refunds = match var(&format!("{prefix}_REFUNDS")) {
                Some(value) => parse_bool(&value)
                    .with_context(|| format!("{prefix}_REFUNDS must be true or false"))?,
                None => true,
            };
            providers.push(ProviderConfig {
                provider_type,
                base_url,
                api_key: var(&format!("{prefix}_API_KEY")),
                refunds,
            });
        }

        let webhook = match (var("WEBHOOK_URL"), var("WEBHOOK_SECRET")) {
            (Some(url), Some(secret)) => Some(WebhookConfig {
                url,
                secret,
                timeout: seconds("WEBHOOK_TIMEOUT_SECS", 5)?,
            }),
            (Some(_), None) => {
                anyhow::bail!("WEBHOOK_SECRET environment variable is required when WEBHOOK_URL is set")
            }
            (None, _) => None,
        };

        Ok(Self {
            port,
            provider_timeout,
            publish_timeout,
            providers,
            webhook,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.publish_timeout, Duration::from_secs(10));
        assert!(config.providers.is_empty());
        assert!(config.webhook.is_none());
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_providers_from_env() {
        let config = load(&[
            ("PROVIDER_PAYPAL_URL", "https://paypal.test"),
            ("PROVIDER_PAYPAL_API_KEY", "sk_paypal"),
            ("PROVIDER_VISANET_URL", "https://visanet.test"),
            ("PROVIDER_VISANET_REFUNDS", "false"),
            ("PROVIDER_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        assert_eq!(config.providers.len(), 2);

        let visanet = &config.providers[0];
        assert_eq!(visanet.provider_type, ProviderType::Visanet);
        assert!(!visanet.refunds);
        assert!(visanet.api_key.is_none());

        let paypal = &config.providers[1];
        assert_eq!(paypal.provider_type, ProviderType::Paypal);
        assert_eq!(paypal.api_key.as_deref(), Some("sk_paypal"));
        assert!(paypal.refunds);
    }

    #[test]
    fn test_webhook_requires_secret() {
        assert!(load(&[("WEBHOOK_URL", "https://hooks.test")]).is_err());

        let config = load(&[
            ("WEBHOOK_URL", "https://hooks.test"),
            ("WEBHOOK_SECRET", "whsec"),
        ])
        .unwrap();
        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url, "https://hooks.test");
        assert_eq!(webhook.timeout, Duration::from_secs(5));
        assert!(!format!("{:?}", webhook).contains("whsec"));
    }

    #[test]
    fn test_delivery_timeouts_from_env() {
        let config = load(&[
            ("WEBHOOK_URL", "https://hooks.test"),
            ("WEBHOOK_SECRET", "whsec"),
            ("WEBHOOK_TIMEOUT_SECS", "2"),
            ("EVENT_PUBLISH_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.webhook.unwrap().timeout, Duration::from_secs(2));
        assert_eq!(config.publish_timeout, Duration::from_secs(3));
        assert!(load(&[("EVENT_PUBLISH_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[
            ("PROVIDER_PAYPAL_URL", "https://paypal.test"),
            ("PROVIDER_PAYPAL_REFUNDS", "maybe"),
        ])
        .is_err());
    }
}
