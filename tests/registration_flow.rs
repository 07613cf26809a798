//! End-to-end registration against a mock orchestration server.

use cilium_adapter::{spawn_registration_tasks, AdapterConfig, HttpCatalogClient, Overrides};
use httpmock::prelude::*;
use httpmock::Mock;
use std::sync::Arc;
use std::time::Duration;

async fn wait_for_hits(mock: &Mock<'_>, expected: usize) {
    for _ in 0..100 {
        if mock.hits() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("expected {} hits, saw {}", expected, mock.hits());
}

#[tokio::test]
async fn test_startup_registers_static_and_dynamic_capabilities() {
    let server = MockServer::start();

    let workloads = server.mock(|when, then| {
        when.method(POST)
            .path("/api/oam/workload")
            .json_body_partial(r#"{"host": "cilium-adapter:10012"}"#);
        then.status(200);
    });
    let traits = server.mock(|when, then| {
        when.method(POST).path("/api/oam/trait");
        then.status(200);
    });
    let dynamic = server.mock(|when, then| {
        when.method(POST)
            .path("/api/oam/workload/generate")
            .json_body_partial(
                r#"{
                    "url": "https://example.com/chart",
                    "generationMethod": "Helm",
                    "adapterAddress": "cilium-adapter:10012",
                    "timeoutInMinutes": 30,
                    "config": { "name": "CILIUM_SERVICE_MESH" }
                }"#,
            );
        then.status(200);
    });

    // Bare host:port exercises the http:// prefixing
    let address = server.address().to_string();
    let overrides = Overrides::new(
        Some("https://example.com/chart".to_string()),
        Some("Helm".to_string()),
        Some(address),
        Some("cilium-adapter".to_string()),
    );
    let config = Arc::new(AdapterConfig::new(10012, overrides));

    let tasks = spawn_registration_tasks(Arc::new(HttpCatalogClient::new()), config);

    wait_for_hits(&workloads, 1).await;
    wait_for_hits(&traits, 1).await;
    wait_for_hits(&dynamic, 1).await;

    // Static registration runs once and ends; the refresh loop keeps going
    tokio::time::timeout(Duration::from_secs(5), tasks.static_capabilities)
        .await
        .expect("static registration should finish")
        .expect("static registration task should not fail");
    assert!(!tasks.dynamic_capabilities.is_finished());

    tasks.dynamic_capabilities.abort();
}

#[tokio::test]
async fn test_unreachable_server_does_not_end_refresh_loop() {
    let overrides = Overrides::new(None, None, Some("127.0.0.1:65534".to_string()), None);
    let config = Arc::new(AdapterConfig::new(10012, overrides));

    let tasks = spawn_registration_tasks(Arc::new(HttpCatalogClient::new()), config);

    // Static registration gives up quietly
    tokio::time::timeout(Duration::from_secs(10), tasks.static_capabilities)
        .await
        .expect("static registration should finish")
        .expect("static registration task should not fail");

    // The refresh loop is left waiting for its next tick
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!tasks.dynamic_capabilities.is_finished());

    tasks.dynamic_capabilities.abort();
}
