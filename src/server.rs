//! Adapter HTTP listener
//!
//! Provides HTTP endpoints for:
//! - Liveness (`/health`)
//! - Build and identity info (`/info`)
//!
//! This is the adapter's request-serving path; registration runs beside it in
//! background tasks and never delays it.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::mesh;

/// Identity of the running adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub mesh: String,
    pub version: String,
    pub git_sha: String,
    pub port: u16,
    pub started_at: DateTime<Utc>,
}

impl ServiceInfo {
    pub fn new(port: u16) -> Self {
        Self {
            name: mesh::SERVICE_NAME.to_string(),
            mesh: mesh::MESH_NAME.to_string(),
            version: mesh::version().to_string(),
            git_sha: mesh::git_sha().to_string(),
            port,
            started_at: Utc::now(),
        }
    }
}

pub struct AdapterServer {
    host: String,
    info: Arc<ServiceInfo>,
}

impl AdapterServer {
    pub fn new(host: impl Into<String>, info: ServiceInfo) -> Self {
        Self {
            host: host.into(),
            info: Arc::new(info),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/info", get(service_info))
            .layer(TraceLayer::new_for_http())
            .with_state(self.info.clone())
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.host, self.info.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Adapter listening at {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn service_info(State(info): State<Arc<ServiceInfo>>) -> impl IntoResponse {
    Json(info.as_ref().clone())
}
