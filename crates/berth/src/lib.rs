//! # Berth
//!
//! Berth provisions assembly components as Docker containers, then binds
//! each container's address into DNS and into the component store.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use berth::config::ProvisionerConfig;
//! use berth::lifecycle::DockerProvisioner;
//! use berth::naming::MemoryRegistrar;
//! use berth::registry::ProvisionerRegistry;
//! use berth::store::FileComponentStore;
//!
//! # async fn example(mut assembly: berth_common::AssemblyWithComponents) -> berth_common::BerthResult<()> {
//! let config = Arc::new(ProvisionerConfig::from_file("/etc/berth/berth.toml")?);
//! let registry = ProvisionerRegistry::new();
//! DockerProvisioner::with_docker(
//!     config,
//!     Arc::new(FileComponentStore::new("/var/lib/berth/components")),
//!     Arc::new(MemoryRegistrar::new()),
//! )
//! .register(&registry);
//!
//! let id = assembly.id.clone();
//! let outcome = registry.create("docker", &mut assembly, &id, false, "").await?;
//! println!("{} is up at {}", outcome.hostname, outcome.ip);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod endpoint;
pub mod lifecycle;
pub mod naming;
pub mod policy;
pub mod registry;
pub mod runtime;
pub mod store;

pub use config::ProvisionerConfig;
pub use lifecycle::{DockerProvisioner, ProvisionOutcome};
pub use registry::{Provisioner, ProvisionerRegistry};
