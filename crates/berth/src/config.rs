//! Provisioner configuration.
//!
//! Configuration is a TOML document addressed with `section:key` paths, so
//! `swarm:host` reads `host` from the `[swarm]` table:
//!
//! ```toml
//! [swarm]
//! host = "tcp://10.0.0.2:2375"
//!
//! [aws]
//! accesskey = "AKIA..."
//! secretkey = "..."
//!
//! [docker]
//! timeout_secs = 30
//! ```

use std::path::Path;
use std::time::Duration;

use berth_common::{BerthError, BerthResult};

/// Shared pool address used for the `baremetal` endpoint.
pub const SWARM_HOST: &str = "swarm:host";
/// Naming service access key.
pub const AWS_ACCESS_KEY: &str = "aws:accesskey";
/// Naming service secret key.
pub const AWS_SECRET_KEY: &str = "aws:secretkey";
/// Deadline for each external call, in seconds.
pub const DOCKER_TIMEOUT: &str = "docker:timeout_secs";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials handed to the naming service.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    /// Access key.
    pub access_key: String,
    /// Secret key.
    pub secret_key: String,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Provisioner configuration, injected into the resolver and binder.
#[derive(Debug, Clone, Default)]
pub struct ProvisionerConfig {
    table: toml::Table,
}

impl ProvisionerConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not valid TOML.
    pub fn from_toml_str(content: &str) -> BerthResult<Self> {
        let table: toml::Table = toml::from_str(content)?;
        Ok(Self { table })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> BerthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BerthError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded provisioner configuration");
        Ok(config)
    }

    /// Set a string value at a `section:key` path.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        let mut parts = key.split(':').peekable();
        let mut table = &mut self.table;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                table.insert(part.to_string(), toml::Value::String(value.into()));
                break;
            }
            let entry = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if !entry.is_table() {
                *entry = toml::Value::Table(toml::Table::new());
            }
            match entry {
                toml::Value::Table(next) => table = next,
                _ => break,
            }
        }
        self
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split(':');
        let first = parts.next()?;
        let mut value = self.table.get(first)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value)
    }

    /// Read a string value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is absent or not a string.
    pub fn get_string(&self, key: &str) -> BerthResult<String> {
        match self.lookup(key) {
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(BerthError::config(format!(
                "{} must be a string, found {}",
                key,
                other.type_str()
            ))),
            None => Err(BerthError::config(format!(
                "missing configuration key {}",
                key
            ))),
        }
    }

    /// The shared pool address behind the `baremetal` endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `swarm:host` is not set.
    pub fn swarm_host(&self) -> BerthResult<String> {
        self.get_string(SWARM_HOST)
    }

    /// Naming service credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either key is not set.
    pub fn aws_credentials(&self) -> BerthResult<AwsCredentials> {
        Ok(AwsCredentials {
            access_key: self.get_string(AWS_ACCESS_KEY)?,
            secret_key: self.get_string(AWS_SECRET_KEY)?,
        })
    }

    /// Deadline for each external call (default 30 seconds).
    ///
    /// A malformed value falls back to the default with a warning.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = match self.lookup(DOCKER_TIMEOUT) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(toml::Value::Integer(n)) if *n > 0 => n.unsigned_abs(),
            Some(toml::Value::String(s)) => {
                s.parse::<u64>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
                    tracing::warn!(value = %s, "Invalid {}, using default", DOCKER_TIMEOUT);
                    DEFAULT_TIMEOUT_SECS
                })
            }
            Some(other) => {
                tracing::warn!(value = %other, "Invalid {}, using default", DOCKER_TIMEOUT);
                DEFAULT_TIMEOUT_SECS
            }
        };
        Duration::from_secs(secs)
    }
}
