//! Container runtime call surface.

use std::sync::Arc;

use async_trait::async_trait;
use berth_common::{BerthResult, ContainerId};

use super::types::{ContainerDetails, ContainerHandle, CreateOptions};
use crate::endpoint::Endpoint;

/// Operations the provisioner needs from a container runtime.
///
/// Implementations never retry; every failure is returned to the caller.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create a container from an image.
    async fn create_container(&self, options: &CreateOptions) -> BerthResult<ContainerHandle>;

    /// Start a created container.
    async fn start_container(&self, id: &ContainerId) -> BerthResult<()>;

    /// Fetch the current state of a container.
    async fn inspect_container(&self, id: &ContainerId) -> BerthResult<ContainerDetails>;

    /// Kill a running container.
    async fn kill_container(&self, id: &ContainerId) -> BerthResult<()>;
}

/// Turns a resolved endpoint into a connected runtime client.
pub trait RuntimeConnector: Send + Sync {
    /// Connect to the runtime at `endpoint`.
    fn connect(&self, endpoint: &Endpoint) -> BerthResult<Arc<dyn ContainerRuntime>>;
}
