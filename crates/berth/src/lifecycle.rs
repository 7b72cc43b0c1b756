//! Docker provisioning lifecycle.
//!
//! Create runs, in order and without rollback:
//!
//! ```text
//! resolve endpoint → image → domain → create → start → inspect → persist → bind name
//! ```
//!
//! Delete resolves the endpoint and the recorded container ID, then kills
//! the container. See [`crate::policy`] for which failures abort.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use berth_common::{AssemblyWithComponents, BerthError, BerthResult, ContainerId};
use serde::Serialize;

use crate::config::ProvisionerConfig;
use crate::endpoint::{Endpoint, EndpointResolver};
use crate::naming::{HostnameBinding, HostnameRegistrar, NamingBinder};
use crate::policy::{Action, Step, swallow};
use crate::registry::{Provisioner, ProvisionerRegistry};
use crate::runtime::{CreateOptions, DockerConnector, NetworkBinding, RuntimeConnector};
use crate::store::{ComponentStateWriter, ComponentStore, OUTPUT_ID};

/// Component input naming the image to run.
pub const SOURCE_INPUT: &str = "source";
/// Component input naming the DNS domain.
pub const DOMAIN_INPUT: &str = "domain";

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    /// The started container.
    pub container_id: ContainerId,
    /// Its assigned address.
    pub ip: IpAddr,
    /// Its hostname.
    pub hostname: HostnameBinding,
    /// The runtime endpoint used.
    pub endpoint: String,
    /// Best-effort steps that failed.
    pub degraded: Vec<Step>,
}

impl ProvisionOutcome {
    /// Returns true if every best-effort step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

fn aborted(action: Action, step: Step) -> impl FnOnce(&BerthError) {
    move |e: &BerthError| tracing::error!(?action, %step, error = %e, "Provisioning step failed")
}

/// Provisions assembly components as Docker containers.
#[derive(Clone)]
pub struct DockerProvisioner {
    resolver: EndpointResolver,
    connector: Arc<dyn RuntimeConnector>,
    writer: ComponentStateWriter,
    binder: NamingBinder,
}

impl DockerProvisioner {
    /// Name this provisioner registers under.
    pub const NAME: &'static str = "docker";

    /// Create a provisioner over explicit collaborators.
    pub fn new(
        config: Arc<ProvisionerConfig>,
        connector: Arc<dyn RuntimeConnector>,
        store: Arc<dyn ComponentStore>,
        registrar: Arc<dyn HostnameRegistrar>,
    ) -> Self {
        let deadline = config.request_timeout();
        Self {
            resolver: EndpointResolver::new(Arc::clone(&config)),
            connector,
            writer: ComponentStateWriter::new(store, deadline),
            binder: NamingBinder::new(config, registrar),
        }
    }

    /// Create a provisioner that talks to Docker Engine endpoints.
    pub fn with_docker(
        config: Arc<ProvisionerConfig>,
        store: Arc<dyn ComponentStore>,
        registrar: Arc<dyn HostnameRegistrar>,
    ) -> Self {
        let connector = Arc::new(DockerConnector::new(config.request_timeout()));
        Self::new(config, connector, store, registrar)
    }

    /// Register this provisioner as `docker`.
    pub fn register(self, registry: &ProvisionerRegistry) {
        registry.register(Self::NAME, Arc::new(self));
    }
}

#[async_trait]
impl Provisioner for DockerProvisioner {
    async fn create(
        &self,
        assembly: &mut AssemblyWithComponents,
        _id: &str,
        _instance: bool,
        _action_id: &str,
    ) -> BerthResult<ProvisionOutcome> {
        tracing::info!(
            assembly = %assembly.id,
            components = assembly.components.len(),
            "Provisioning assembly"
        );

        let endpoint = self
            .resolver
            .resolve(&assembly.inputs)
            .inspect_err(aborted(Action::Create, Step::ResolveEndpoint))?;

        let component = assembly
            .first_component_mut()
            .inspect_err(aborted(Action::Create, Step::ResolveImage))?;
        let image = component
            .inputs
            .get(SOURCE_INPUT)
            .inspect_err(aborted(Action::Create, Step::ResolveImage))?
            .to_string();
        let domain = component
            .inputs
            .get(DOMAIN_INPUT)
            .inspect_err(aborted(Action::Create, Step::ResolveDomain))?
            .to_string();
        let hostname = HostnameBinding::derive(&component.name, &domain);

        let runtime = self
            .connector
            .connect(&endpoint)
            .inspect_err(aborted(Action::Create, Step::Create))?;

        tracing::info!(endpoint = %endpoint, image = %image, name = %hostname, "Creating container");
        let handle = runtime
            .create_container(&CreateOptions::new(image, hostname.fqdn()))
            .await
            .inspect_err(aborted(Action::Create, Step::Create))?;
        let container_id = handle.id;

        runtime
            .start_container(&container_id)
            .await
            .inspect_err(aborted(Action::Create, Step::Start))?;
        tracing::info!(container = %container_id.short(), "Container started");

        let details = runtime
            .inspect_container(&container_id)
            .await
            .inspect_err(aborted(Action::Create, Step::Inspect))?;
        let binding = NetworkBinding::from_details(&container_id, &details)
            .inspect_err(aborted(Action::Create, Step::Inspect))?;
        tracing::info!(container = %container_id.short(), ip = %binding.ip, "Container address assigned");

        let mut degraded = Vec::new();
        if !self.writer.record(component, &binding).await {
            degraded.push(Step::Persist);
        }
        if !self
            .binder
            .bind(&hostname, binding.ip)
            .await
            .inspect_err(aborted(Action::Create, Step::BindName))?
        {
            degraded.push(Step::BindName);
        }

        Ok(ProvisionOutcome {
            container_id,
            ip: binding.ip,
            hostname,
            endpoint: endpoint.to_string(),
            degraded,
        })
    }

    async fn delete(
        &self,
        assembly: &AssemblyWithComponents,
        _id: &str,
    ) -> BerthResult<ContainerId> {
        tracing::info!(assembly = %assembly.id, "Tearing down assembly");

        let endpoint = swallow(
            Action::Delete,
            Step::ResolveEndpoint,
            self.resolver.resolve(&assembly.inputs),
        )
        .unwrap_or_else(Endpoint::empty);

        let container_id = swallow(
            Action::Delete,
            Step::ResolveContainerId,
            assembly
                .first_component()
                .and_then(|c| c.outputs.get(OUTPUT_ID).map(ContainerId::new_unchecked)),
        )
        .unwrap_or_else(|| ContainerId::new_unchecked(""));

        let runtime = self
            .connector
            .connect(&endpoint)
            .inspect_err(aborted(Action::Delete, Step::Kill))?;
        runtime
            .kill_container(&container_id)
            .await
            .inspect_err(aborted(Action::Delete, Step::Kill))?;

        tracing::info!(container = %container_id.short(), endpoint = %endpoint, "Container was killed");
        Ok(container_id)
    }
}
