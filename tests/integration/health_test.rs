use super::common;

use common::test_server::TestServer;
use restmock::config::StorageSettings;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
    assert_eq!(body["checks"]["endpoints"], 2);
    assert_eq!(body["checks"]["store"], "ok");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/ready"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_health_ready_without_definitions() {
    let server = TestServer::with_storage(StorageSettings::default(), vec![]).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/ready"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/live"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    // Should contain Prometheus metrics
    assert!(body.contains("restmock_seeded_records_total"));
}

#[tokio::test]
async fn test_sqlite_bootstrap_reports_seeded_endpoints() {
    let server = TestServer::sqlite().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["checks"]["definitions"], "ok");
    assert_eq!(body["checks"]["endpoints"], 2);
    assert_eq!(body["checks"]["store"], "ok");

    let response = client
        .get(server.url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Serving 2 endpoints");

    // Every declared endpoint was seeded to its count before routes went live
    for (endpoint, count) in [("users", 3), ("products", 2)] {
        let list: serde_json::Value = client
            .get(server.url(&format!("/api/{}", endpoint)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list.as_array().unwrap().len(), count, "seeded {}", endpoint);
    }
}
