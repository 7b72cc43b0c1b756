//! Hostname binding for provisioned containers.
//!
//! A component named `web` with domain input `example.com` is reachable as
//! `web.example.com`; the naming service receives subdomain `web` under
//! domain `example.com.`.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use berth_common::{BerthError, BerthResult};
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::ProvisionerConfig;
use crate::policy::{Action, Step, best_effort};

/// A component's fully qualified hostname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HostnameBinding(String);

impl HostnameBinding {
    /// Derive `<component-name>.<domain>`.
    #[must_use]
    pub fn derive(component_name: &str, domain: &str) -> Self {
        Self(format!("{}.{}", component_name, domain))
    }

    /// The fully qualified name.
    #[must_use]
    pub fn fqdn(&self) -> &str {
        &self.0
    }

    /// Split into the subdomain (first label) and the domain suffix (the
    /// remaining labels with a trailing dot).
    ///
    /// # Errors
    ///
    /// Fails unless the name has at least three non-empty labels.
    pub fn split(&self) -> BerthResult<(&str, String)> {
        let labels: Vec<&str> = self.0.split('.').collect();
        if labels.len() < 3 || labels.iter().any(|l| l.is_empty()) {
            return Err(BerthError::Naming {
                message: format!("cannot split {:?} into subdomain and domain", self.0),
            });
        }
        Ok((labels[0], format!("{}.", labels[1..].join("."))))
    }
}

impl std::fmt::Display for HostnameBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One request to the naming service.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    /// Access key.
    pub access_key: String,
    /// Secret key.
    pub secret_key: String,
    /// Domain suffix, with trailing dot (`example.com.`).
    pub domain: String,
    /// Subdomain label.
    pub subdomain: String,
    /// Address to bind.
    pub ip: IpAddr,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("ip", &self.ip)
            .finish()
    }
}

/// External service binding subdomain/domain/IP triples into DNS.
#[async_trait]
pub trait HostnameRegistrar: Send + Sync {
    /// Register the binding.
    async fn register(&self, registration: &Registration) -> BerthResult<()>;
}

/// Registrar that keeps bindings in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistrar {
    records: RwLock<Vec<Registration>>,
}

impl MemoryRegistrar {
    /// Create an empty registrar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All registrations received, oldest first.
    pub fn registrations(&self) -> Vec<Registration> {
        self.records.read().clone()
    }

    /// Resolve `subdomain.domain.` to the most recently registered address.
    pub fn resolve(&self, fqdn: &str) -> Option<IpAddr> {
        let wanted = fqdn.trim_end_matches('.');
        self.records
            .read()
            .iter()
            .rev()
            .find(|r| format!("{}.{}", r.subdomain, r.domain.trim_end_matches('.')) == wanted)
            .map(|r| r.ip)
    }
}

#[async_trait]
impl HostnameRegistrar for MemoryRegistrar {
    async fn register(&self, registration: &Registration) -> BerthResult<()> {
        tracing::debug!(
            subdomain = %registration.subdomain,
            domain = %registration.domain,
            ip = %registration.ip,
            "Hostname registered"
        );
        self.records.write().push(registration.clone());
        Ok(())
    }
}

/// Registers component hostnames with the naming service.
#[derive(Clone)]
pub struct NamingBinder {
    config: Arc<ProvisionerConfig>,
    registrar: Arc<dyn HostnameRegistrar>,
    deadline: Duration,
}

impl NamingBinder {
    /// Create a binder; the deadline bounds each registration.
    pub fn new(config: Arc<ProvisionerConfig>, registrar: Arc<dyn HostnameRegistrar>) -> Self {
        let deadline = config.request_timeout();
        Self {
            config,
            registrar,
            deadline,
        }
    }

    /// Bind `binding` to `ip`.
    ///
    /// Returns whether the naming service accepted the binding; its
    /// failures are logged and never propagated.
    ///
    /// # Errors
    ///
    /// Fails only if the naming credentials are not configured.
    pub async fn bind(&self, binding: &HostnameBinding, ip: IpAddr) -> BerthResult<bool> {
        let credentials = self.config.aws_credentials()?;

        let registered = best_effort(Action::Create, Step::BindName, self.deadline, async {
            let (subdomain, domain) = binding.split()?;
            let registration = Registration {
                access_key: credentials.access_key,
                secret_key: credentials.secret_key,
                domain,
                subdomain: subdomain.to_string(),
                ip,
            };
            self.registrar.register(&registration).await
        })
        .await
        .is_some();

        if registered {
            tracing::info!(hostname = %binding, %ip, "Hostname bound");
        }
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AWS_ACCESS_KEY, AWS_SECRET_KEY};
    use proptest::prelude::*;

    fn config() -> Arc<ProvisionerConfig> {
        Arc::new(
            ProvisionerConfig::new()
                .with_value(AWS_ACCESS_KEY, "access")
                .with_value(AWS_SECRET_KEY, "secret"),
        )
    }

    struct Refusing;

    #[async_trait]
    impl HostnameRegistrar for Refusing {
        async fn register(&self, _: &Registration) -> BerthResult<()> {
            Err(BerthError::Naming {
                message: "throttled".to_string(),
            })
        }
    }

    #[test]
    fn split_three_labels() {
        let binding = HostnameBinding::derive("web", "example.com");
        assert_eq!(binding.fqdn(), "web.example.com");
        let (sub, domain) = binding.split().unwrap();
        assert_eq!(sub, "web");
        assert_eq!(domain, "example.com.");
    }

    #[test]
    fn split_keeps_deeper_domains() {
        let binding = HostnameBinding::derive("api", "eu.example.co.uk");
        let (sub, domain) = binding.split().unwrap();
        assert_eq!(sub, "api");
        assert_eq!(domain, "eu.example.co.uk.");
    }

    #[test]
    fn split_rejects_short_names() {
        assert!(HostnameBinding::derive("web", "localhost").split().is_err());
        assert!(HostnameBinding::derive("web", "example.").split().is_err());
    }

    #[tokio::test]
    async fn bind_registers_with_credentials() {
        let registrar = Arc::new(MemoryRegistrar::new());
        let binder = NamingBinder::new(config(), registrar.clone());

        let bound = binder
            .bind(&HostnameBinding::derive("web", "example.com"), "10.0.0.7".parse().unwrap())
            .await
            .unwrap();
        assert!(bound);

        let records = registrar.registrations();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].access_key, "access");
        assert_eq!(records[0].domain, "example.com.");
        assert_eq!(records[0].subdomain, "web");
        assert_eq!(
            registrar.resolve("web.example.com"),
            Some("10.0.0.7".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn registration_failure_is_swallowed() {
        let binder = NamingBinder::new(config(), Arc::new(Refusing));
        let bound = binder
            .bind(&HostnameBinding::derive("web", "example.com"), "10.0.0.7".parse().unwrap())
            .await
            .unwrap();
        assert!(!bound);
    }

    #[tokio::test]
    async fn unsplittable_name_is_swallowed() {
        let registrar = Arc::new(MemoryRegistrar::new());
        let binder = NamingBinder::new(config(), registrar.clone());
        let bound = binder
            .bind(&HostnameBinding::derive("web", "localhost"), "10.0.0.7".parse().unwrap())
            .await
            .unwrap();
        assert!(!bound);
        assert!(registrar.registrations().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_abort() {
        let binder = NamingBinder::new(
            Arc::new(ProvisionerConfig::new()),
            Arc::new(MemoryRegistrar::new()),
        );
        let err = binder
            .bind(&HostnameBinding::derive("web", "example.com"), "10.0.0.7".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::Config { .. }));
    }

    #[test]
    fn registration_debug_hides_secret() {
        let registration = Registration {
            access_key: "a".to_string(),
            secret_key: "topsecret".to_string(),
            domain: "example.com.".to_string(),
            subdomain: "web".to_string(),
            ip: "10.0.0.1".parse().unwrap(),
        };
        insta::assert_debug_snapshot!(registration, @r#"
        Registration {
            access_key: "a",
            secret_key: "<redacted>",
            domain: "example.com.",
            subdomain: "web",
            ip: 10.0.0.1,
        }
        "#);
    }

    proptest! {
        #[test]
        fn split_recovers_parts(name in "[a-z][a-z0-9-]{0,10}", domain in "[a-z]{1,8}\\.[a-z]{2,4}") {
            let binding = HostnameBinding::derive(&name, &domain);
            let (sub, suffix) = binding.split().unwrap();
            prop_assert_eq!(sub, name.as_str());
            prop_assert_eq!(suffix, format!("{}.", domain));
        }
    }
}
