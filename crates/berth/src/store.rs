//! Component record persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use berth_common::{BerthError, BerthResult, Component, KeyValueList};
use parking_lot::RwLock;

use crate::policy::{Action, Step, best_effort};
use crate::runtime::NetworkBinding;

/// Output key carrying the container's address.
pub const OUTPUT_IP: &str = "ip";
/// Output key carrying the container ID.
pub const OUTPUT_ID: &str = "id";

/// Persistent store of component records, keyed by component ID.
#[async_trait]
pub trait ComponentStore: Send + Sync {
    /// Overwrite the record stored under `id`.
    async fn write(&self, id: &str, component: &Component) -> BerthResult<()>;

    /// Read the record stored under `id`.
    async fn read(&self, id: &str) -> BerthResult<Component>;
}

/// Stores each component as `<bucket>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileComponentStore {
    bucket: PathBuf,
}

impl FileComponentStore {
    /// Create a store rooted at `bucket`. The directory is created on first write.
    pub fn new(bucket: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// The bucket directory.
    #[must_use]
    pub fn bucket(&self) -> &Path {
        &self.bucket
    }

    /// Path of the record for `id`.
    ///
    /// # Errors
    ///
    /// Fails for IDs that are empty or would escape the bucket.
    pub fn record_path(&self, id: &str) -> BerthResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(BerthError::Store {
                message: format!("invalid component id {id:?}"),
            });
        }
        Ok(self.bucket.join(format!("{id}.json")))
    }
}

#[async_trait]
impl ComponentStore for FileComponentStore {
    async fn write(&self, id: &str, component: &Component) -> BerthResult<()> {
        let path = self.record_path(id)?;

        tokio::fs::create_dir_all(&self.bucket)
            .await
            .map_err(|e| BerthError::Store {
                message: format!("Failed to open bucket {}: {}", self.bucket.display(), e),
            })?;

        let json = serde_json::to_string_pretty(component)?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;

        tracing::debug!(component = %id, path = %path.display(), "Saved component record");
        Ok(())
    }

    async fn read(&self, id: &str) -> BerthResult<Component> {
        let path = self.record_path(id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BerthError::Store {
                    message: format!("component not found: {id}"),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let component = serde_json::from_str(&json)?;

        tracing::debug!(component = %id, path = %path.display(), "Loaded component record");
        Ok(component)
    }
}

/// In-memory component store.
#[derive(Debug, Default)]
pub struct MemoryComponentStore {
    records: RwLock<HashMap<String, Component>>,
}

impl MemoryComponentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ComponentStore for MemoryComponentStore {
    async fn write(&self, id: &str, component: &Component) -> BerthResult<()> {
        self.records.write().insert(id.to_string(), component.clone());
        Ok(())
    }

    async fn read(&self, id: &str) -> BerthResult<Component> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| BerthError::Store {
                message: format!("component not found: {id}"),
            })
    }
}

/// Writes runtime facts back into component records.
#[derive(Clone)]
pub struct ComponentStateWriter {
    store: Arc<dyn ComponentStore>,
    deadline: Duration,
}

impl ComponentStateWriter {
    /// Create a writer over `store`; the deadline bounds each write.
    pub fn new(store: Arc<dyn ComponentStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// The outputs recorded for a started container: exactly `ip` and `id`.
    #[must_use]
    pub fn outputs_for(binding: &NetworkBinding) -> KeyValueList {
        [
            (OUTPUT_IP, binding.ip.to_string()),
            (OUTPUT_ID, binding.container_id.to_string()),
        ]
        .into_iter()
        .collect()
    }

    /// Replace the component's outputs with the binding and persist it.
    ///
    /// Earlier outputs are discarded. Returns whether the record was
    /// written; store failures are logged and never propagated.
    pub async fn record(&self, component: &mut Component, binding: &NetworkBinding) -> bool {
        tracing::debug!(component = %component.id, "Updating component with ip and container id");
        component.outputs = Self::outputs_for(binding);

        let written = best_effort(
            Action::Create,
            Step::Persist,
            self.deadline,
            self.store.write(&component.id, component),
        )
        .await
        .is_some();

        if written {
            tracing::info!(component = %component.id, "Component record updated");
        }
        written
    }
}
