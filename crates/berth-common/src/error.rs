//! Common error types for the Berth provisioner.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`BerthError`].
pub type BerthResult<T> = Result<T, BerthError>;

/// Errors raised while provisioning or tearing down a component.
#[derive(Error, Diagnostic, Debug)]
pub enum BerthError {
    /// A required key is absent from a key/value input list.
    #[error("Missing required input: {key}")]
    #[diagnostic(
        code(berth::input::missing),
        help("Add the key to the assembly or component inputs")
    )]
    MissingInput {
        /// The key that was looked up.
        key: String,
    },

    /// The assembly carries no components.
    #[error("Assembly has no components: {assembly}")]
    #[diagnostic(code(berth::input::no_component))]
    MissingComponent {
        /// The assembly identifier.
        assembly: String,
    },

    /// Container not found on the runtime.
    #[error("Container not found: {id}")]
    #[diagnostic(code(berth::container::not_found))]
    ContainerNotFound {
        /// The container ID that was not found.
        id: String,
    },

    /// Invalid container ID format.
    #[error("Invalid container ID: {id:?}")]
    #[diagnostic(
        code(berth::container::invalid_id),
        help("Container IDs must be alphanumeric with hyphens and underscores, 1-128 characters")
    )]
    InvalidContainerId {
        /// The invalid container ID.
        id: String,
    },

    /// A runtime response did not have the expected shape.
    #[error("Failed to extract {what} from runtime response: {message}")]
    #[diagnostic(code(berth::runtime::extraction))]
    Extraction {
        /// What was being extracted.
        what: String,
        /// Why extraction failed.
        message: String,
    },

    /// The container reported no usable network address after start.
    #[error("Container {id} has no assigned IP address")]
    #[diagnostic(
        code(berth::runtime::no_address),
        help("Check that the container is attached to a network with IPAM enabled")
    )]
    MissingAddress {
        /// The container ID.
        id: String,
    },

    /// The container runtime rejected an operation.
    #[error("Runtime {operation} failed: {message}")]
    #[diagnostic(code(berth::runtime::call))]
    Runtime {
        /// The runtime operation (create, start, inspect, kill).
        operation: String,
        /// The runtime's error message.
        message: String,
    },

    /// Transport-level failure talking to an external service.
    #[error("Network error: {message}")]
    #[diagnostic(code(berth::network))]
    Network {
        /// The error message.
        message: String,
    },

    /// Hostname registration failed.
    #[error("Naming service error: {message}")]
    #[diagnostic(code(berth::naming))]
    Naming {
        /// The error message.
        message: String,
    },

    /// Component store failure.
    #[error("Component store error: {message}")]
    #[diagnostic(code(berth::store))]
    Store {
        /// The error message.
        message: String,
    },

    /// No provisioner registered under the requested name.
    #[error("Provisioner not registered: {name}")]
    #[diagnostic(code(berth::registry::not_found))]
    ProvisionerNotFound {
        /// The requested provisioner name.
        name: String,
    },

    /// A step exceeded its deadline.
    #[error("Timed out after {seconds}s: {operation}")]
    #[diagnostic(code(berth::timeout))]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The deadline in seconds.
        seconds: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(berth::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(berth::serialization))]
    Serialization(String),

    /// Feature not supported.
    #[error("Feature not supported: {feature}")]
    #[diagnostic(code(berth::unsupported))]
    Unsupported {
        /// The unsupported feature.
        feature: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(berth::config))]
    Config {
        /// The error message.
        message: String,
    },
}

impl BerthError {
    /// Shorthand for a [`BerthError::Runtime`] error.
    pub fn runtime(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Runtime {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`BerthError::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for BerthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BerthError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BerthError::ContainerNotFound {
            id: "abc123".to_string(),
        };
        assert_eq!(err.to_string(), "Container not found: abc123");
    }

    #[test]
    fn missing_input_names_the_key() {
        let err = BerthError::MissingInput {
            key: "endpoint".to_string(),
        };
        insta::assert_snapshot!(err.to_string(), @"Missing required input: endpoint");
    }

    #[test]
    fn runtime_shorthand() {
        let err = BerthError::runtime("start", "no such image");
        assert_eq!(err.to_string(), "Runtime start failed: no such image");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BerthError = io_err.into();
        assert!(matches!(err, BerthError::Io(_)));
    }

    #[test]
    fn error_from_toml() {
        let err: BerthError = toml::from_str::<toml::Table>("swarm = ").unwrap_err().into();
        assert!(matches!(err, BerthError::Config { .. }));
    }
}
