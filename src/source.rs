//! Component source resolution
//!
//! Decides where the dynamic components of a registration cycle come from and
//! how the orchestration server should interpret that location.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::Overrides;
use crate::mesh::{CHART_PATH, UPSTREAM_REPO};

/// Strategy used to turn a remote source into CRD documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMethod {
    #[default]
    Manifest,
    Helm,
}

impl GenerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMethod::Manifest => "Manifest",
            GenerationMethod::Helm => "Helm",
        }
    }

    /// Exact, case-sensitive match on the recognized names
    pub fn from_override(value: &str) -> Option<Self> {
        match value {
            "Manifest" => Some(GenerationMethod::Manifest),
            "Helm" => Some(GenerationMethod::Helm),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where this cycle's components come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSource {
    pub url: String,
    pub method: GenerationMethod,
}

/// Upstream chart metadata URL for a Cilium release
pub fn default_source_url(version: &str) -> String {
    format!("https://{}/{}/{}", UPSTREAM_REPO, version, CHART_PATH)
}

/// Resolve the component source for one registration cycle.
///
/// An overridden URL whose method is not exactly `Helm` or `Manifest` is
/// treated as a manifest source, even when it points at a chart.
pub fn resolve(overrides: &Overrides, version_hint: &str) -> RegistrationSource {
    match overrides.comp_gen_url.as_deref() {
        Some(url) => {
            let method = overrides
                .comp_gen_method
                .as_deref()
                .and_then(GenerationMethod::from_override)
                .unwrap_or_default();
            info!(
                "Registering workload components from url {} using {} method...",
                url, method
            );
            RegistrationSource {
                url: url.to_string(),
                method,
            }
        }
        None => {
            info!(
                "Registering latest workload components for version {}",
                version_hint
            );
            RegistrationSource {
                url: default_source_url(version_hint),
                method: GenerationMethod::Manifest,
            }
        }
    }
}
