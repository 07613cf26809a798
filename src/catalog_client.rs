//! Catalog registration client
//!
//! Talks to the orchestration server's component catalog:
//! - Dynamic registration: the server generates workload components from a
//!   chart or manifest source using the supplied CRD filter
//! - Static registration: one fixed workload or trait definition at a time
//!
//! Every call is best-effort. Callers log failures and carry on; nothing here
//! retries.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::capabilities::{CapabilityDefinition, DefinitionKind};
use crate::filter::FilterSpec;
use crate::mesh::MeshIdentity;
use crate::source::RegistrationSource;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Failed to reach orchestration server: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Orchestration server rejected registration ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Registration timed out after {} minutes", .0.as_secs() / 60)]
    TimedOut(Duration),
    #[error("Invalid capability definition {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

/// One dynamic registration, built fresh for every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRequest {
    pub server_address: String,
    pub adapter_address: String,
    pub source: RegistrationSource,
    pub filter: FilterSpec,
    pub mesh: MeshIdentity,
    pub operation: String,
    pub timeout: Duration,
}

impl RegistrationRequest {
    fn body(&self) -> DynamicComponentsBody<'_> {
        DynamicComponentsBody {
            url: &self.source.url,
            generation_method: self.source.method.as_str(),
            adapter_address: &self.adapter_address,
            timeout_in_minutes: self.timeout.as_secs() / 60,
            operation: &self.operation,
            config: GenerationConfig {
                name: &self.mesh.name,
                mesh_version: &self.mesh.version,
                filter: &self.filter,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DynamicComponentsBody<'a> {
    url: &'a str,
    generation_method: &'a str,
    adapter_address: &'a str,
    timeout_in_minutes: u64,
    operation: &'a str,
    config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    name: &'a str,
    mesh_version: &'a str,
    filter: &'a FilterSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionBody<'a> {
    oam_definition: &'a serde_json::Value,
    oam_ref_schema: &'a str,
    host: &'a str,
    metadata: &'a BTreeMap<String, String>,
}

/// Remote catalog the adapter publishes its capabilities to
#[async_trait]
pub trait CatalogRegistry: Send + Sync {
    /// Ask the server to generate and store components from `request.source`
    async fn register_dynamic(
        &self,
        request: &RegistrationRequest,
    ) -> Result<(), RegistrationError>;

    /// Store one fixed workload or trait definition
    async fn register_definition(
        &self,
        server_address: &str,
        adapter_address: &str,
        definition: &CapabilityDefinition,
    ) -> Result<(), RegistrationError>;
}

/// HTTP implementation of [`CatalogRegistry`]
#[derive(Debug, Clone, Default)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<(), RegistrationError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(RegistrationError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CatalogRegistry for HttpCatalogClient {
    async fn register_dynamic(
        &self,
        request: &RegistrationRequest,
    ) -> Result<(), RegistrationError> {
        let url = format!(
            "{}/api/oam/workload/generate",
            request.server_address.trim_end_matches('/')
        );
        debug!("Posting dynamic component request to {}", url);

        let resp = self
            .client
            .post(url)
            .timeout(request.timeout)
            .json(&request.body())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistrationError::TimedOut(request.timeout)
                } else {
                    RegistrationError::Http(e)
                }
            })?;

        Self::check(resp).await
    }

    async fn register_definition(
        &self,
        server_address: &str,
        adapter_address: &str,
        definition: &CapabilityDefinition,
    ) -> Result<(), RegistrationError> {
        let path = match definition.kind {
            DefinitionKind::Workload => "workload",
            DefinitionKind::Trait => "trait",
        };
        let url = format!("{}/api/oam/{}", server_address.trim_end_matches('/'), path);
        debug!("Registering {} {} at {}", path, definition.name, url);

        let resp = self
            .client
            .post(url)
            .json(&DefinitionBody {
                oam_definition: &definition.oam_definition,
                oam_ref_schema: &definition.oam_ref_schema,
                host: adapter_address,
                metadata: &definition.metadata,
            })
            .send()
            .await?;

        Self::check(resp).await
    }
}

/// Run one dynamic registration, abandoning it after `request.timeout`
pub async fn register_dynamic(
    registry: &dyn CatalogRegistry,
    request: &RegistrationRequest,
) -> Result<(), RegistrationError> {
    match tokio::time::timeout(request.timeout, registry.register_dynamic(request)).await {
        Ok(result) => result,
        Err(_) => Err(RegistrationError::TimedOut(request.timeout)),
    }
}
