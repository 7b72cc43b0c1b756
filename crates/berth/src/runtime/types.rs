//! Typed runtime requests and responses.

use std::collections::BTreeMap;
use std::net::IpAddr;

use berth_common::{BerthError, BerthResult, ContainerId};
use serde::{Deserialize, Serialize};

/// Options for creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// Image reference (e.g. `nginx:latest`).
    pub image: String,
    /// Container name.
    pub name: String,
}

impl CreateOptions {
    /// Create options for `image` named `name`.
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
        }
    }
}

/// Handle to a container returned by create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// The runtime-assigned container ID.
    pub id: ContainerId,
    /// Warnings emitted by the runtime during create.
    pub warnings: Vec<String>,
}

/// Container state as reported by inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDetails {
    /// Full container ID.
    pub id: String,
    /// Container name (engine prefixes it with `/`).
    #[serde(default)]
    pub name: String,
    /// Run state.
    #[serde(default)]
    pub state: RunState,
    /// Network settings.
    #[serde(default)]
    pub network_settings: NetworkSettings,
}

/// Run state section of an inspect response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunState {
    /// Whether the container is running.
    #[serde(default)]
    pub running: bool,
    /// Status string (`created`, `running`, `exited`, ...).
    #[serde(default)]
    pub status: String,
}

/// Network section of an inspect response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    /// Address on the default bridge network.
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
    /// Per-network attachments.
    #[serde(default)]
    pub networks: Option<BTreeMap<String, NetworkAttachment>>,
}

/// One network attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkAttachment {
    /// Address on this network.
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,
}

impl ContainerDetails {
    /// Details of a running container with a single address.
    pub fn running(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            state: RunState {
                running: true,
                status: "running".to_string(),
            },
            network_settings: NetworkSettings {
                ip_address: ip.into(),
                networks: None,
            },
        }
    }

    /// The container's address: the default network address if set,
    /// otherwise the first non-empty per-network address.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        let settings = &self.network_settings;
        if !settings.ip_address.is_empty() {
            return Some(&settings.ip_address);
        }
        settings
            .networks
            .iter()
            .flat_map(|networks| networks.values())
            .map(|n| n.ip_address.as_str())
            .find(|ip| !ip.is_empty())
    }
}

/// A container's identity and address after it has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBinding {
    /// Container ID.
    pub container_id: ContainerId,
    /// Assigned address.
    pub ip: IpAddr,
}

impl NetworkBinding {
    /// Build the binding for `id` from inspect output.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::MissingAddress`] if no address is assigned and
    /// [`BerthError::Extraction`] if the address does not parse.
    pub fn from_details(id: &ContainerId, details: &ContainerDetails) -> BerthResult<Self> {
        let raw = details.ip_address().ok_or_else(|| BerthError::MissingAddress {
            id: id.to_string(),
        })?;
        let ip = raw.parse::<IpAddr>().map_err(|e| BerthError::Extraction {
            what: "IP address".to_string(),
            message: format!("{raw:?}: {e}"),
        })?;
        Ok(Self {
            container_id: id.clone(),
            ip,
        })
    }
}
