//! Static capabilities
//!
//! Workload and trait definitions that are fixed for the Cilium distribution.
//! They ship inside the binary and are registered once at start-up, without
//! any manifest parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::catalog_client::{CatalogRegistry, RegistrationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionKind {
    Workload,
    Trait,
}

/// A single static workload or trait ready to be registered
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDefinition {
    pub kind: DefinitionKind,
    pub name: String,
    pub oam_definition: serde_json::Value,
    pub oam_ref_schema: String,
    pub metadata: BTreeMap<String, String>,
}

struct EmbeddedDefinition {
    kind: DefinitionKind,
    name: &'static str,
    definition: &'static str,
    schema: &'static str,
}

const STATIC_DEFINITIONS: &[EmbeddedDefinition] = &[
    EmbeddedDefinition {
        kind: DefinitionKind::Workload,
        name: "CiliumMesh",
        definition: include_str!("definitions/cilium_mesh.workload.json"),
        schema: include_str!("definitions/cilium_mesh.schema.json"),
    },
    EmbeddedDefinition {
        kind: DefinitionKind::Trait,
        name: "Hubble",
        definition: include_str!("definitions/hubble.trait.json"),
        schema: include_str!("definitions/hubble.schema.json"),
    },
];

impl EmbeddedDefinition {
    fn load(&self) -> Result<CapabilityDefinition, RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidDefinition {
            name: self.name.to_string(),
            reason,
        };

        let oam_definition: serde_json::Value = serde_json::from_str(self.definition)
            .map_err(|e| invalid(format!("definition: {}", e)))?;
        // The schema travels as a string but must still be valid JSON.
        serde_json::from_str::<serde_json::Value>(self.schema)
            .map_err(|e| invalid(format!("schema: {}", e)))?;

        Ok(CapabilityDefinition {
            kind: self.kind,
            name: self.name.to_string(),
            oam_definition,
            oam_ref_schema: self.schema.to_string(),
            metadata: BTreeMap::from([
                ("adapter.meshery.io/name".to_string(), "cilium".to_string()),
                ("ui.meshery.io/category".to_string(), "Service Mesh".to_string()),
            ]),
        })
    }
}

/// All embedded definitions of the given kind
pub fn definitions(kind: DefinitionKind) -> Result<Vec<CapabilityDefinition>, RegistrationError> {
    STATIC_DEFINITIONS
        .iter()
        .filter(|d| d.kind == kind)
        .map(EmbeddedDefinition::load)
        .collect()
}

/// Register every definition of one kind, stopping at the first failure
pub async fn register_kind(
    registry: &dyn CatalogRegistry,
    kind: DefinitionKind,
    server_address: &str,
    adapter_address: &str,
) -> Result<(), RegistrationError> {
    for definition in definitions(kind)? {
        registry
            .register_definition(server_address, adapter_address, &definition)
            .await?;
    }
    Ok(())
}

/// Register the static workloads, then the static traits.
///
/// A workload failure is logged and trait registration still runs. The first
/// failure is returned for callers that want it.
pub async fn register_static(
    registry: &dyn CatalogRegistry,
    server_address: &str,
    adapter_address: &str,
) -> Result<(), RegistrationError> {
    info!("Registering static workloads...");
    let workloads =
        register_kind(registry, DefinitionKind::Workload, server_address, adapter_address).await;
    if let Err(e) = &workloads {
        info!("{}", e);
    }
    info!("Registering static workloads completed");

    let traits =
        register_kind(registry, DefinitionKind::Trait, server_address, adapter_address).await;
    if let Err(e) = &traits {
        info!("{}", e);
    }

    workloads.and(traits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_client::RegistrationRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every definition it sees; fails workloads when asked to
    #[derive(Default)]
    struct RecordingRegistry {
        fail_workloads: bool,
        seen: Mutex<Vec<(DefinitionKind, String, String)>>,
    }

    #[async_trait]
    impl CatalogRegistry for RecordingRegistry {
        async fn register_dynamic(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<(), RegistrationError> {
            Ok(())
        }

        async fn register_definition(
            &self,
            _server_address: &str,
            adapter_address: &str,
            definition: &CapabilityDefinition,
        ) -> Result<(), RegistrationError> {
            self.seen.lock().unwrap().push((
                definition.kind,
                definition.name.clone(),
                adapter_address.to_string(),
            ));
            if self.fail_workloads && definition.kind == DefinitionKind::Workload {
                return Err(RegistrationError::Rejected {
                    status: 500,
                    body: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_embedded_definitions_parse() {
        let workloads = definitions(DefinitionKind::Workload).unwrap();
        let traits = definitions(DefinitionKind::Trait).unwrap();

        assert!(!workloads.is_empty());
        assert!(!traits.is_empty());
        assert_eq!(workloads[0].oam_definition["kind"], "WorkloadDefinition");
        assert_eq!(traits[0].oam_definition["kind"], "TraitDefinition");
    }

    #[test]
    fn test_definition_names_match_documents() {
        for kind in [DefinitionKind::Workload, DefinitionKind::Trait] {
            for def in definitions(kind).unwrap() {
                assert_eq!(def.oam_definition["metadata"]["name"], def.name.as_str());
            }
        }
    }

    #[tokio::test]
    async fn test_register_static_workloads_then_traits() {
        let registry = RecordingRegistry::default();

        register_static(&registry, "http://localhost:9081", "localhost:10012")
            .await
            .unwrap();

        let seen = registry.seen.lock().unwrap();
        assert_eq!(seen.len(), STATIC_DEFINITIONS.len());
        assert_eq!(seen[0].0, DefinitionKind::Workload);
        assert_eq!(seen.last().unwrap().0, DefinitionKind::Trait);
        assert!(seen.iter().all(|(_, _, host)| host == "localhost:10012"));
    }

    #[tokio::test]
    async fn test_workload_failure_still_registers_traits() {
        let registry = RecordingRegistry {
            fail_workloads: true,
            ..Default::default()
        };

        let result = register_static(&registry, "http://localhost:9081", "localhost:10012").await;
        assert!(matches!(
            result,
            Err(RegistrationError::Rejected { status: 500, .. })
        ));

        let seen = registry.seen.lock().unwrap();
        assert!(seen.iter().any(|(kind, _, _)| *kind == DefinitionKind::Trait));
    }
}
