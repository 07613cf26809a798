//! Adapter Configuration
//!
//! Defines the configuration surface of the registration subsystem:
//! - Environment overrides (component source, generation method, addresses)
//! - Server and self-advertised address resolution
//! - Registration timing constants
//!
//! Everything here is resolved from an explicit [`Overrides`] snapshot so the
//! rules can be exercised without touching the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::mesh::MeshIdentity;

pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:9081";
pub const DEFAULT_SERVICE_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 10012;

/// Period between dynamic registration cycles (24 hours)
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on a single dynamic registration call (30 minutes)
pub const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Snapshot of the recognized environment overrides
/// (`COMP_GEN_URL`, `COMP_GEN_METHOD`, `MESHERY_SERVER`, `SERVICE_ADDR`).
///
/// Empty values are normalized to `None`, so an exported-but-empty variable
/// behaves the same as an unset one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub comp_gen_url: Option<String>,
    pub comp_gen_method: Option<String>,
    pub meshery_server: Option<String>,
    pub service_addr: Option<String>,
}

impl Overrides {
    pub fn new(
        comp_gen_url: Option<String>,
        comp_gen_method: Option<String>,
        meshery_server: Option<String>,
        service_addr: Option<String>,
    ) -> Self {
        Self {
            comp_gen_url: non_empty(comp_gen_url),
            comp_gen_method: non_empty(comp_gen_method),
            meshery_server: non_empty(meshery_server),
            service_addr: non_empty(service_addr),
        }
    }

    /// Orchestration server base URL.
    ///
    /// An override that already carries a scheme is used verbatim, a bare
    /// `host:port` gets `http://` prepended.
    pub fn server_address(&self) -> String {
        match self.meshery_server.as_deref() {
            Some(addr) if addr.starts_with("http://") || addr.starts_with("https://") => {
                addr.to_string()
            }
            Some(addr) => format!("http://{}", addr),
            None => DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }

    /// Host the orchestration server should use to call back into the adapter
    pub fn service_host(&self) -> &str {
        self.service_addr.as_deref().unwrap_or(DEFAULT_SERVICE_HOST)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolved adapter configuration shared (read-only) by the background tasks
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Port the adapter listens on
    pub port: u16,
    /// Environment overrides, consulted on every cycle
    pub overrides: Overrides,
    /// Mesh identity sent with dynamic registrations
    pub mesh: MeshIdentity,
    /// Bound on a single dynamic registration
    pub registration_timeout: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            overrides: Overrides::default(),
            mesh: MeshIdentity::default(),
            registration_timeout: REGISTRATION_TIMEOUT,
        }
    }
}

impl AdapterConfig {
    pub fn new(port: u16, overrides: Overrides) -> Self {
        Self {
            port,
            overrides,
            ..Default::default()
        }
    }

    pub fn server_address(&self) -> String {
        self.overrides.server_address()
    }

    /// `host:port` the adapter advertises to the orchestration server
    pub fn adapter_address(&self) -> String {
        format!("{}:{}", self.overrides.service_host(), self.port)
    }
}

/// Root directory shared by Meshery components (`~/.meshery`)
pub fn root_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".meshery")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_override(addr: &str) -> Overrides {
        Overrides::new(None, None, Some(addr.to_string()), None)
    }

    #[test]
    fn test_default_server_address() {
        assert_eq!(
            Overrides::default().server_address(),
            "http://localhost:9081"
        );
    }

    #[test]
    fn test_server_address_without_scheme_gets_http() {
        assert_eq!(
            server_override("registry.internal:9081").server_address(),
            "http://registry.internal:9081"
        );
    }

    #[test]
    fn test_server_address_with_scheme_is_verbatim() {
        assert_eq!(
            server_override("https://meshery.example.com").server_address(),
            "https://meshery.example.com"
        );
        assert_eq!(
            server_override("http://10.0.0.4:9081").server_address(),
            "http://10.0.0.4:9081"
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let overrides = Overrides::new(
            Some(String::new()),
            Some(String::new()),
            Some(String::new()),
            Some(String::new()),
        );
        assert_eq!(overrides, Overrides::default());
        assert_eq!(overrides.server_address(), DEFAULT_SERVER_ADDRESS);
        assert_eq!(overrides.service_host(), "localhost");
    }

    #[test]
    fn test_adapter_address() {
        let config = AdapterConfig::new(10012, Overrides::default());
        assert_eq!(config.adapter_address(), "localhost:10012");

        let overrides = Overrides::new(None, None, None, Some("cilium-adapter".to_string()));
        let config = AdapterConfig::new(10012, overrides);
        assert_eq!(config.adapter_address(), "cilium-adapter:10012");
    }

    #[test]
    fn test_default_timing() {
        let config = AdapterConfig::default();
        assert_eq!(config.registration_timeout, Duration::from_secs(1800));
        assert_eq!(REFRESH_INTERVAL, Duration::from_secs(86400));
        assert!(REGISTRATION_TIMEOUT < REFRESH_INTERVAL);
    }

    #[test]
    fn test_root_path_ends_with_meshery() {
        assert!(root_path().ends_with(".meshery"));
    }
}
