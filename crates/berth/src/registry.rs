//! Provisioner plugin registry.
//!
//! The surrounding system dispatches deployment requests to provisioners by
//! name; each provisioner registers itself once at startup.

use std::sync::Arc;

use async_trait::async_trait;
use berth_common::{AssemblyWithComponents, BerthError, BerthResult, ContainerId};
use dashmap::DashMap;

use crate::lifecycle::ProvisionOutcome;

/// A provisioner the registry can dispatch to.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Provision the assembly.
    ///
    /// `id`, `instance` and `action_id` are part of the dispatch contract;
    /// implementations may ignore them.
    async fn create(
        &self,
        assembly: &mut AssemblyWithComponents,
        id: &str,
        instance: bool,
        action_id: &str,
    ) -> BerthResult<ProvisionOutcome>;

    /// Tear the assembly's container down. Returns the ID that was killed.
    async fn delete(&self, assembly: &AssemblyWithComponents, id: &str)
    -> BerthResult<ContainerId>;
}

/// Name-indexed set of provisioners.
#[derive(Default)]
pub struct ProvisionerRegistry {
    provisioners: DashMap<String, Arc<dyn Provisioner>>,
}

impl ProvisionerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provisioner` under `name`, replacing any earlier entry.
    pub fn register(&self, name: impl Into<String>, provisioner: Arc<dyn Provisioner>) {
        let name = name.into();
        if self.provisioners.insert(name.clone(), provisioner).is_some() {
            tracing::warn!(provisioner = %name, "Replaced registered provisioner");
        } else {
            tracing::debug!(provisioner = %name, "Registered provisioner");
        }
    }

    /// Look up a provisioner.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::ProvisionerNotFound`] for unknown names.
    pub fn get(&self, name: &str) -> BerthResult<Arc<dyn Provisioner>> {
        self.provisioners
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BerthError::ProvisionerNotFound {
                name: name.to_string(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.provisioners.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Dispatch a create to the provisioner registered as `name`.
    ///
    /// # Errors
    ///
    /// Fails if no such provisioner exists or the provisioner fails.
    pub async fn create(
        &self,
        name: &str,
        assembly: &mut AssemblyWithComponents,
        id: &str,
        instance: bool,
        action_id: &str,
    ) -> BerthResult<ProvisionOutcome> {
        let provisioner = self.get(name)?;
        provisioner.create(assembly, id, instance, action_id).await
    }

    /// Dispatch a delete to the provisioner registered as `name`.
    ///
    /// # Errors
    ///
    /// Fails if no such provisioner exists or the provisioner fails.
    pub async fn delete(
        &self,
        name: &str,
        assembly: &AssemblyWithComponents,
        id: &str,
    ) -> BerthResult<ContainerId> {
        let provisioner = self.get(name)?;
        provisioner.delete(assembly, id).await
    }
}
