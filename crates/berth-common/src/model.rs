//! Assembly and component records exchanged with the provisioner.
//!
//! An assembly is the unit a caller asks to deploy; each of its components
//! carries its own inputs and receives runtime facts in its outputs.

use serde::{Deserialize, Serialize};

use crate::error::{BerthError, BerthResult};
use crate::kv::KeyValueList;

/// A deployment request: one assembly with its ordered components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyWithComponents {
    /// Assembly identifier.
    pub id: String,
    /// Assembly name.
    #[serde(default)]
    pub name: String,
    /// Inputs shared by all components (e.g. `endpoint`).
    #[serde(default)]
    pub inputs: KeyValueList,
    /// Components in declaration order.
    #[serde(default)]
    pub components: Vec<Component>,
    /// Assembly status as reported by the caller.
    #[serde(default)]
    pub status: String,
    /// Creation timestamp as reported by the caller.
    #[serde(default)]
    pub created_at: String,
}

impl AssemblyWithComponents {
    /// The first component, which the docker provisioner acts on.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::MissingComponent`] for an empty assembly.
    pub fn first_component(&self) -> BerthResult<&Component> {
        self.components
            .first()
            .ok_or_else(|| BerthError::MissingComponent {
                assembly: self.id.clone(),
            })
    }

    /// Mutable access to the first component.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::MissingComponent`] for an empty assembly.
    pub fn first_component_mut(&mut self) -> BerthResult<&mut Component> {
        let assembly = self.id.clone();
        self.components
            .first_mut()
            .ok_or(BerthError::MissingComponent { assembly })
    }
}

/// One deployable unit within an assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component identifier; the persistence key.
    pub id: String,
    /// Component name; the first label of its hostname.
    pub name: String,
    /// TOSCA node type (e.g. `tosca.web.docker`).
    #[serde(default)]
    pub tosca_type: String,
    /// Inputs (`source`, `domain`, ...).
    #[serde(default)]
    pub inputs: KeyValueList,
    /// Outputs discovered at runtime (`ip`, `id`).
    #[serde(default)]
    pub outputs: KeyValueList,
    /// Deployable artifact description.
    #[serde(default)]
    pub artifacts: Artifacts,
    /// Identifiers of related components.
    #[serde(default)]
    pub related_components: Vec<String>,
    /// Lifecycle operations attached to the component.
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Component status.
    #[serde(default)]
    pub status: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
}

/// Artifact attached to a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    /// Artifact type.
    #[serde(default)]
    pub artifact_type: String,
    /// Artifact content or location.
    #[serde(default)]
    pub content: String,
    /// Requirements of the artifact.
    #[serde(default)]
    pub requirements: KeyValueList,
}

/// A lifecycle operation declared on a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation type.
    #[serde(default)]
    pub operation_type: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Operation requirements.
    #[serde(default)]
    pub operation_requirements: KeyValueList,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"{
        "id": "AMS001",
        "name": "web",
        "inputs": [{"key": "endpoint", "value": "10.0.0.5:2375"}],
        "components": [{
            "id": "COM001",
            "name": "nginx",
            "tosca_type": "tosca.web.docker",
            "inputs": [
                {"key": "source", "value": "nginx:latest"},
                {"key": "domain", "value": "example.com"}
            ],
            "outputs": [],
            "related_components": ["COM002"]
        }]
    }"#;

    #[test]
    fn parses_request() {
        let assembly: AssemblyWithComponents = serde_json::from_str(REQUEST).unwrap();
        assert_eq!(assembly.inputs.get("endpoint").unwrap(), "10.0.0.5:2375");

        let component = assembly.first_component().unwrap();
        assert_eq!(component.name, "nginx");
        assert_eq!(component.inputs.get("domain").unwrap(), "example.com");
        assert!(component.outputs.is_empty());
        assert_eq!(component.related_components, vec!["COM002"]);
    }

    #[test]
    fn empty_assembly_has_no_first_component() {
        let mut assembly = AssemblyWithComponents {
            id: "AMS002".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            assembly.first_component(),
            Err(BerthError::MissingComponent { .. })
        ));
        assert!(assembly.first_component_mut().is_err());
    }

    #[test]
    fn component_survives_json() {
        let assembly: AssemblyWithComponents = serde_json::from_str(REQUEST).unwrap();
        let component = assembly.first_component().unwrap();
        let json = serde_json::to_string(component).unwrap();
        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, component);
    }
}
