//! Ordered key/value input and output lists.

use serde::{Deserialize, Serialize};

use crate::error::{BerthError, BerthResult};

/// A single key/value entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    /// Case-sensitive key.
    pub key: String,
    /// Value.
    pub value: String,
}

impl KeyValuePair {
    /// Create a new pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of key/value pairs.
///
/// Lookups never default: a missing key is a [`BerthError::MissingInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueList(Vec<KeyValuePair>);

impl KeyValueList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the first value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::MissingInput`] if the key is absent.
    pub fn get(&self, key: &str) -> BerthResult<&str> {
        self.0
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
            .ok_or_else(|| BerthError::MissingInput {
                key: key.to_string(),
            })
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|pair| pair.key == key)
    }

    /// Replace the value stored under `key`, appending if absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|pair| pair.key == key) {
            Some(pair) => pair.value = value,
            None => self.0.push(KeyValuePair { key, value }),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyValuePair> {
        self.0.iter()
    }

    /// The keys, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|pair| pair.key.as_str()).collect()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyValueList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (key, value) in iter {
            list.set(key, value);
        }
        list
    }
}

impl<'a> IntoIterator for &'a KeyValueList {
    type Item = &'a KeyValuePair;
    type IntoIter = std::slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
