//! Cilium Service Mesh Adapter
//!
//! Publishes the Cilium distribution's workload and trait capabilities to the
//! Meshery orchestration server.
//!
//! ## Module Structure
//!
//! - `mesh`: Mesh identity and build version
//! - `config`: Environment overrides and address resolution
//! - `source`: Component source resolution (URL + generation method)
//! - `filter`: CRD filter specification
//! - `catalog_client`: Registration calls to the orchestration server
//! - `capabilities`: Static workload and trait definitions
//! - `scheduler`: Dynamic capability refresh loop
//! - `supervisor`: Panic-safe background tasks
//! - `server`: Adapter HTTP listener

pub mod capabilities;
pub mod catalog_client;
pub mod config;
pub mod filter;
pub mod mesh;
pub mod scheduler;
pub mod server;
pub mod source;
pub mod supervisor;

pub use catalog_client::{
    CatalogRegistry, HttpCatalogClient, RegistrationError, RegistrationRequest,
};
pub use config::{AdapterConfig, Overrides};
pub use filter::FilterSpec;
pub use mesh::MeshIdentity;
pub use scheduler::{RefreshScheduler, ScheduleState};
pub use server::{AdapterServer, ServiceInfo};
pub use source::{GenerationMethod, RegistrationSource};

use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handles of the two background registration tasks
pub struct RegistrationTasks {
    pub static_capabilities: JoinHandle<()>,
    pub dynamic_capabilities: JoinHandle<()>,
}

/// Launch static registration (once) and the dynamic refresh loop (forever).
///
/// Both run as supervised tasks; the caller is free to ignore the handles.
pub fn spawn_registration_tasks(
    registry: Arc<dyn CatalogRegistry>,
    config: Arc<AdapterConfig>,
) -> RegistrationTasks {
    let static_registry = registry.clone();
    let server_address = config.server_address();
    let adapter_address = config.adapter_address();
    let static_capabilities = supervisor::spawn_supervised("static-capabilities", async move {
        // Failures are already logged by the registrar
        let _ = capabilities::register_static(
            static_registry.as_ref(),
            &server_address,
            &adapter_address,
        )
        .await;
    });

    let dynamic_capabilities = RefreshScheduler::new(registry, config).spawn();

    RegistrationTasks {
        static_capabilities,
        dynamic_capabilities,
    }
}
