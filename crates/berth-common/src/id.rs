//! Container identifier validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BerthError, BerthResult};

/// A validated container ID as assigned by the runtime.
///
/// Container IDs must:
/// - Be 1-128 characters long
/// - Contain only alphanumeric characters, hyphens, and underscores
/// - Start with an alphanumeric character
///
/// Docker hands out 64-character hex IDs; swarm front ends may prefix them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Maximum length of a container ID.
    pub const MAX_LENGTH: usize = 128;

    /// Create a new container ID, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID format is invalid.
    pub fn new(id: impl Into<String>) -> BerthResult<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a container ID without validation.
    ///
    /// Only the teardown path uses this, where an unrecorded ID is still
    /// handed to the runtime so it can reject it.
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the container ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty (only possible via `new_unchecked`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(id: &str) -> BerthResult<()> {
        let invalid = || BerthError::InvalidContainerId { id: id.to_string() };

        if id.is_empty() || id.len() > Self::MAX_LENGTH {
            return Err(invalid());
        }

        let mut chars = id.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        if chars.any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_') {
            return Err(invalid());
        }

        Ok(())
    }

    /// Returns a short version of the ID (first 12 characters).
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContainerId {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ContainerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_container_ids() {
        assert!(ContainerId::new("abc123").is_ok());
        assert!(ContainerId::new("my-container").is_ok());
        assert!(ContainerId::new("my_container").is_ok());
        assert!(ContainerId::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn invalid_container_ids() {
        assert!(ContainerId::new("").is_err());
        assert!(ContainerId::new("-invalid").is_err());
        assert!(ContainerId::new("_invalid").is_err());
        assert!(ContainerId::new("invalid!").is_err());
        assert!(ContainerId::new("a".repeat(129)).is_err());
    }

    #[test]
    fn unchecked_allows_empty() {
        let id = ContainerId::new_unchecked("");
        assert!(id.is_empty());
        assert_eq!(id.short(), "");
    }

    #[test]
    fn short_id() {
        let id = ContainerId::new("4fa6e0f0c6786287e131c3852c58a2e0").unwrap();
        assert_eq!(id.short(), "4fa6e0f0c678");
        assert_eq!(id.to_string(), "4fa6e0f0c6786287e131c3852c58a2e0");
    }

    #[test]
    fn serde_is_transparent() {
        let id: ContainerId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }
}
