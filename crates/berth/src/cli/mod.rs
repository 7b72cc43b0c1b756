//! CLI command definitions and handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use berth_common::AssemblyWithComponents;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};

use crate::config::ProvisionerConfig;
use crate::lifecycle::DockerProvisioner;
use crate::naming::MemoryRegistrar;
use crate::registry::ProvisionerRegistry;
use crate::store::{ComponentStore, FileComponentStore};

/// Berth - provision assembly components as containers
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the provisioner configuration (TOML)
    #[arg(short, long, global = true, env = "BERTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding component records
    #[arg(long, global = true, env = "BERTH_STORE")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Berth commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Provision the first component of an assembly
    Create {
        /// Assembly request file (YAML or JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Request identifier (defaults to the assembly ID)
        #[arg(long)]
        id: Option<String>,

        /// Provision as an instance
        #[arg(long)]
        instance: bool,

        /// Action identifier
        #[arg(long, default_value = "")]
        action_id: String,

        /// Provisioner to dispatch to
        #[arg(short, long, default_value = DockerProvisioner::NAME)]
        provisioner: String,
    },

    /// Kill the container recorded for an assembly
    Delete {
        /// Assembly request file (YAML or JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Request identifier (defaults to the assembly ID)
        #[arg(long)]
        id: Option<String>,

        /// Take the component's outputs from the component store
        #[arg(long)]
        from_store: bool,

        /// Provisioner to dispatch to
        #[arg(short, long, default_value = DockerProvisioner::NAME)]
        provisioner: String,
    },

    /// Print a stored component record
    Show {
        /// Component ID
        component_id: String,
    },

    /// List registered provisioners
    Provisioners,
}

/// Default location of the configuration file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("berth").join("berth.toml"))
}

/// Default component store directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("berth")
        .join("components")
}

/// Read an assembly request. JSON is accepted as a subset of YAML.
///
/// # Errors
///
/// Fails if the file cannot be read or does not describe an assembly.
pub fn load_request(path: &Path) -> Result<AssemblyWithComponents> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read request {}: {}", path.display(), e))?;
    serde_yaml::from_str(&content)
        .map_err(|e| eyre!("Invalid request {}: {}", path.display(), e))
}

impl Cli {
    /// Tracing directive for the selected verbosity.
    #[must_use]
    pub const fn log_directive(&self) -> &'static str {
        if self.debug { "berth=debug" } else { "berth=info" }
    }

    fn load_config(&self) -> Result<ProvisionerConfig> {
        if let Some(path) = &self.config {
            return ProvisionerConfig::from_file(path)
                .map_err(|e| eyre!("Failed to load configuration: {}", e));
        }
        match default_config_path().filter(|p| p.exists()) {
            Some(path) => ProvisionerConfig::from_file(&path)
                .map_err(|e| eyre!("Failed to load configuration: {}", e)),
            None => {
                tracing::warn!("No configuration file found, using empty configuration");
                Ok(ProvisionerConfig::new())
            }
        }
    }

    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = Arc::new(self.load_config()?);
        let store = Arc::new(FileComponentStore::new(
            self.store.clone().unwrap_or_else(default_store_path),
        ));
        let registrar = Arc::new(MemoryRegistrar::new());

        let registry = ProvisionerRegistry::new();
        DockerProvisioner::with_docker(config, store.clone(), registrar.clone())
            .register(&registry);

        match self.command {
            Commands::Create {
                request,
                id,
                instance,
                action_id,
                provisioner,
            } => {
                let mut assembly = load_request(&request)?;
                let id = id.unwrap_or_else(|| assembly.id.clone());

                let outcome = registry
                    .create(&provisioner, &mut assembly, &id, instance, &action_id)
                    .await
                    .map_err(|e| eyre!("Failed to provision assembly {}: {}", id, e))?;

                for registration in registrar.registrations() {
                    tracing::debug!(?registration, "Recorded hostname binding");
                }
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                Ok(())
            }

            Commands::Delete {
                request,
                id,
                from_store,
                provisioner,
            } => {
                let mut assembly = load_request(&request)?;
                let id = id.unwrap_or_else(|| assembly.id.clone());

                if from_store {
                    let component = assembly
                        .first_component_mut()
                        .map_err(|e| eyre!("Cannot hydrate from store: {}", e))?;
                    *component = store
                        .read(&component.id)
                        .await
                        .map_err(|e| eyre!("Failed to load component: {}", e))?;
                }

                let killed = registry
                    .delete(&provisioner, &assembly, &id)
                    .await
                    .map_err(|e| eyre!("Failed to tear down assembly {}: {}", id, e))?;

                println!("Container {} killed", killed);
                Ok(())
            }

            Commands::Show { component_id } => {
                let component = store
                    .read(&component_id)
                    .await
                    .map_err(|e| eyre!("Failed to load component: {}", e))?;
                println!("{}", serde_json::to_string_pretty(&component)?);
                Ok(())
            }

            Commands::Provisioners => {
                for name in registry.names() {
                    println!("{}", name);
                }
                Ok(())
            }
        }
    }
}
