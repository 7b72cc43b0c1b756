//! Docker Engine API driver.
//!
//! Talks to a Docker daemon (or a swarm front end) over plain HTTP. Only the
//! four calls the provisioner needs are implemented.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use berth_common::{BerthError, BerthResult, ContainerId};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::client::{ContainerRuntime, RuntimeConnector};
use super::types::{ContainerDetails, ContainerHandle, CreateOptions};
use crate::endpoint::Endpoint;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateBody<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateResponse {
    id: String,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct EngineError {
    message: String,
}

/// Turn an endpoint into an HTTP base URL.
///
/// `tcp://h:p` and bare `h:p` become `http://h:p`; `http(s)://` is kept.
///
/// # Errors
///
/// Fails for an empty endpoint or a unix socket.
pub fn base_url(endpoint: &Endpoint) -> BerthResult<String> {
    let raw = endpoint.as_str().trim().trim_end_matches('/');
    if raw.is_empty() {
        return Err(BerthError::config("empty runtime endpoint"));
    }
    if raw.starts_with("unix://") {
        return Err(BerthError::Unsupported {
            feature: format!("unix socket endpoint {raw}"),
        });
    }
    if let Some(rest) = raw.strip_prefix("tcp://") {
        return Ok(format!("http://{rest}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Ok(raw.to_string());
    }
    Ok(format!("http://{raw}"))
}

/// Docker Engine HTTP client.
pub struct DockerEngine {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DockerEngine {
    /// Create a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint cannot be turned into a URL or the HTTP client
    /// cannot be built.
    pub fn new(endpoint: &Endpoint, timeout: Duration) -> BerthResult<Self> {
        let base_url = base_url(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BerthError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> BerthResult<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                BerthError::Timeout {
                    operation: operation.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                BerthError::Network {
                    message: format!("Failed to request {}: {}", operation, e),
                }
            }
        })
    }

    /// Map a non-success response to an error carrying the engine's message.
    async fn failure(operation: &str, id: Option<&ContainerId>, response: Response) -> BerthError {
        let status = response.status();
        let message = match response.json::<EngineError>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };

        match id {
            Some(id) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(container = %id, %message, "Engine reported no such container");
                BerthError::ContainerNotFound { id: id.to_string() }
            }
            _ => BerthError::runtime(operation, format!("{} ({})", message, status)),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerEngine {
    async fn create_container(&self, options: &CreateOptions) -> BerthResult<ContainerHandle> {
        let url = self.url("/containers/create");
        tracing::debug!(url = %url, image = %options.image, name = %options.name, "Creating container");

        let request = self
            .client
            .post(&url)
            .query(&[("name", options.name.as_str())])
            .json(&CreateBody {
                image: &options.image,
            });
        let response = self.send("create", request).await?;

        if !response.status().is_success() {
            return Err(Self::failure("create", None, response).await);
        }

        let body: CreateResponse = response.json().await.map_err(|e| BerthError::Extraction {
            what: "container ID".to_string(),
            message: e.to_string(),
        })?;
        let id = ContainerId::new(body.id).map_err(|e| BerthError::Extraction {
            what: "container ID".to_string(),
            message: e.to_string(),
        })?;
        let warnings = body.warnings.unwrap_or_default();
        for warning in &warnings {
            tracing::warn!(container = %id.short(), %warning, "Engine warning on create");
        }

        Ok(ContainerHandle { id, warnings })
    }

    async fn start_container(&self, id: &ContainerId) -> BerthResult<()> {
        let url = self.url(&format!("/containers/{}/start", id));
        tracing::debug!(url = %url, "Starting container");

        let response = self.send("start", self.client.post(&url)).await?;
        match response.status() {
            StatusCode::NOT_MODIFIED => {
                tracing::debug!(container = %id.short(), "Container already started");
                Ok(())
            }
            s if s.is_success() => Ok(()),
            _ => Err(Self::failure("start", Some(id), response).await),
        }
    }

    async fn inspect_container(&self, id: &ContainerId) -> BerthResult<ContainerDetails> {
        let url = self.url(&format!("/containers/{}/json", id));
        tracing::debug!(url = %url, "Inspecting container");

        let response = self.send("inspect", self.client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(Self::failure("inspect", Some(id), response).await);
        }

        response.json().await.map_err(|e| BerthError::Extraction {
            what: "container state".to_string(),
            message: e.to_string(),
        })
    }

    async fn kill_container(&self, id: &ContainerId) -> BerthResult<()> {
        let url = self.url(&format!("/containers/{}/kill", id));
        tracing::debug!(url = %url, "Killing container");

        let response = self.send("kill", self.client.post(&url)).await?;
        if !response.status().is_success() {
            return Err(Self::failure("kill", Some(id), response).await);
        }
        Ok(())
    }
}

/// Connects to Docker Engine endpoints.
#[derive(Debug, Clone)]
pub struct DockerConnector {
    timeout: Duration,
}

impl DockerConnector {
    /// Create a connector whose clients use `timeout` per request.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RuntimeConnector for DockerConnector {
    fn connect(&self, endpoint: &Endpoint) -> BerthResult<Arc<dyn ContainerRuntime>> {
        let engine = DockerEngine::new(endpoint, self.timeout)?;
        tracing::debug!(endpoint = %endpoint, url = %engine.base_url(), "Connected to Docker engine");
        Ok(Arc::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_for(raw: &str) -> BerthResult<String> {
        base_url(&Endpoint::new(raw))
    }

    #[test]
    fn normalizes_endpoints() {
        assert_eq!(url_for("10.0.0.5:2375").unwrap(), "http://10.0.0.5:2375");
        assert_eq!(url_for("tcp://10.0.0.5:2375").unwrap(), "http://10.0.0.5:2375");
        assert_eq!(
            url_for("https://swarm.local:2376/").unwrap(),
            "https://swarm.local:2376"
        );
    }

    #[test]
    fn rejects_unusable_endpoints() {
        assert!(matches!(url_for(""), Err(BerthError::Config { .. })));
        assert!(matches!(
            url_for("unix:///var/run/docker.sock"),
            Err(BerthError::Unsupported { .. })
        ));
    }

    #[test]
    fn connector_rejects_empty_endpoint() {
        let connector = DockerConnector::new(Duration::from_secs(1));
        assert!(connector.connect(&Endpoint::empty()).is_err());
    }
}
