//! Container runtime adapter.
//!
//! The provisioner sees the runtime only through [`ContainerRuntime`] and
//! [`RuntimeConnector`]; [`DockerEngine`] is the shipped driver.

mod client;
pub mod docker;
mod types;

pub use client::{ContainerRuntime, RuntimeConnector};
pub use docker::{DockerConnector, DockerEngine};
pub use types::{
    ContainerDetails, ContainerHandle, CreateOptions, NetworkAttachment, NetworkBinding,
    NetworkSettings, RunState,
};
