//! Mesh identity
//!
//! Fixed names identifying the Cilium distribution this adapter serves and the
//! build that is running.

use serde::{Deserialize, Serialize};

/// Name the adapter advertises for itself
pub const SERVICE_NAME: &str = "cilium-adapter";

/// Mesh type name as understood by the orchestration server
pub const MESH_NAME: &str = "CILIUM_SERVICE_MESH";

/// Operation key the generated components are attached to
pub const OPERATION: &str = "cilium_service_mesh";

/// Raw content host of the upstream Cilium repository
pub const UPSTREAM_REPO: &str = "raw.githubusercontent.com/cilium/cilium";

/// Path of the Helm chart metadata inside an upstream release tree
pub const CHART_PATH: &str = "install/kubernetes/cilium/Chart.yaml";

/// Build version, `edge` for untagged builds
pub fn version() -> &'static str {
    option_env!("CILIUM_ADAPTER_VERSION").unwrap_or("edge")
}

/// Git commit the binary was built from
pub fn git_sha() -> &'static str {
    option_env!("CILIUM_ADAPTER_GITSHA").unwrap_or("none")
}

/// Mesh name and version sent along with every dynamic registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshIdentity {
    pub name: String,
    pub version: String,
}

impl MeshIdentity {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: MESH_NAME.to_string(),
            version: version.into(),
        }
    }
}

impl Default for MeshIdentity {
    fn default() -> Self {
        Self::new(version())
    }
}
