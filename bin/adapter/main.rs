//! Cilium Adapter
//!
//! Runs the adapter listener and registers Cilium capabilities with Meshery in
//! the background.

use anyhow::{Context, Result};
use cilium_adapter::{
    config, mesh, spawn_registration_tasks, AdapterConfig, AdapterServer, HttpCatalogClient,
    Overrides, ServiceInfo,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cilium-adapter")]
#[command(about = "Meshery adapter for the Cilium service mesh")]
struct Args {
    /// Adapter port
    #[arg(short, long, default_value_t = config::DEFAULT_PORT, env = "PORT")]
    port: u16,

    /// Adapter bind host
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Orchestration server address
    #[arg(long, env = "MESHERY_SERVER")]
    meshery_server: Option<String>,

    /// Host the orchestration server uses to reach this adapter
    #[arg(long, env = "SERVICE_ADDR")]
    service_addr: Option<String>,

    /// Component source URL (Helm chart or manifests)
    #[arg(long, env = "COMP_GEN_URL")]
    comp_gen_url: Option<String>,

    /// Component generation method: Helm or Manifest
    #[arg(long, env = "COMP_GEN_METHOD")]
    comp_gen_method: Option<String>,

    /// Set to "true" for debug logging
    #[arg(long, env = "DEBUG")]
    debug: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug.as_deref() == Some("true") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("cilium_adapter={}", level).parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    // The rest of the adapter expects the bin directory to exist
    let bin_dir = config::root_path().join("bin");
    std::fs::create_dir_all(&bin_dir)
        .with_context(|| format!("failed to create {}", bin_dir.display()))?;

    info!("Starting {} {} ({})", mesh::SERVICE_NAME, mesh::version(), mesh::git_sha());

    let overrides = Overrides::new(
        args.comp_gen_url,
        args.comp_gen_method,
        args.meshery_server,
        args.service_addr,
    );
    let adapter_config = Arc::new(AdapterConfig::new(args.port, overrides));

    info!("  Meshery server: {}", adapter_config.server_address());
    info!("  Advertised as: {}", adapter_config.adapter_address());

    let registry = Arc::new(HttpCatalogClient::new());
    // Not awaited: both tasks run until the process exits
    let _tasks = spawn_registration_tasks(registry, adapter_config);

    let server = AdapterServer::new(args.host, ServiceInfo::new(args.port));
    server.start().await?;

    Ok(())
}
