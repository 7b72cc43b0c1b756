//! Runtime endpoint resolution.

use std::fmt;
use std::sync::Arc;

use berth_common::{BerthResult, KeyValueList};

use crate::config::ProvisionerConfig;

/// Endpoint value meaning "use the shared pool address from configuration".
pub const BAREMETAL: &str = "baremetal";

/// Input key carrying the endpoint on the assembly.
pub const ENDPOINT_INPUT: &str = "endpoint";

/// A resolved container runtime address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Wrap a literal address.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The placeholder used when teardown could not resolve an address.
    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// The raw address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no address is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides which runtime endpoint a request targets.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    config: Arc<ProvisionerConfig>,
}

impl EndpointResolver {
    /// Create a resolver backed by the given configuration.
    pub fn new(config: Arc<ProvisionerConfig>) -> Self {
        Self { config }
    }

    /// Resolve the assembly's `endpoint` input.
    ///
    /// # Errors
    ///
    /// Fails if the input is missing, or if it is `baremetal` and
    /// `swarm:host` is not configured.
    pub fn resolve(&self, inputs: &KeyValueList) -> BerthResult<Endpoint> {
        let value = inputs.get(ENDPOINT_INPUT)?;
        self.resolve_value(value)
    }

    /// Resolve a raw endpoint value.
    ///
    /// # Errors
    ///
    /// Fails if the value is `baremetal` and `swarm:host` is not configured.
    pub fn resolve_value(&self, value: &str) -> BerthResult<Endpoint> {
        if value == BAREMETAL {
            let host = self.config.swarm_host()?;
            tracing::debug!(endpoint = %host, "Resolved baremetal endpoint from swarm pool");
            return Ok(Endpoint(host));
        }
        Ok(Endpoint::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SWARM_HOST;
    use berth_common::BerthError;
    use proptest::prelude::*;

    fn resolver(config: ProvisionerConfig) -> EndpointResolver {
        EndpointResolver::new(Arc::new(config))
    }

    #[test]
    fn baremetal_uses_swarm_host() {
        let r = resolver(ProvisionerConfig::new().with_value(SWARM_HOST, "10.1.0.1:2375"));
        let inputs: KeyValueList = [("endpoint", "baremetal")].into_iter().collect();
        assert_eq!(r.resolve(&inputs).unwrap().as_str(), "10.1.0.1:2375");
    }

    #[test]
    fn baremetal_without_swarm_host_fails() {
        let r = resolver(ProvisionerConfig::new());
        let err = r.resolve_value(BAREMETAL).unwrap_err();
        assert!(matches!(err, BerthError::Config { .. }));
    }

    #[test]
    fn missing_endpoint_input_fails() {
        let r = resolver(ProvisionerConfig::new());
        let err = r.resolve(&KeyValueList::new()).unwrap_err();
        assert!(matches!(err, BerthError::MissingInput { ref key } if key == "endpoint"));
    }

    #[test]
    fn sentinel_is_case_sensitive() {
        let r = resolver(ProvisionerConfig::new());
        assert_eq!(r.resolve_value("Baremetal").unwrap().as_str(), "Baremetal");
    }

    proptest! {
        #[test]
        fn literal_endpoints_are_verbatim(value in "\\PC*") {
            prop_assume!(value != BAREMETAL);
            let r = resolver(ProvisionerConfig::new().with_value(SWARM_HOST, "pool:2375"));
            let resolved = r.resolve_value(&value).unwrap();
            prop_assert_eq!(resolved.as_str(), value.as_str());
        }
    }
}
