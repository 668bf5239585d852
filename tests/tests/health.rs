//! Tests for health check and metrics endpoints.
//!
//! The health registry is process-global. Only `test_ready_follows_source_check`
//! changes it in this binary; the other tests assert on structure.

use std::sync::Arc;
use std::time::Duration;

use api::{router, AppState};
use axum::http::StatusCode;
use axum_test::TestServer;
use dashboard_service::{DashboardSource, DatasetSource, RemoteSource, SharedSource, SourceKind};
use integration_tests::fixtures;
use integration_tests::setup::{closed_upstream, TestContext};

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body.get("status").is_some(), "Response should have 'status' field");
    assert_eq!(body["source"], "csv");
    assert!(body["dataset_rows"].as_u64().unwrap() > 0);

    let components = body["components"].as_array().expect("components array");
    assert!(components.iter().any(|c| c["name"] == "data_source"));
}

/// Test /health reports a remote source without local rows
#[tokio::test]
async fn test_health_endpoint_remote() {
    let ctx = TestContext::with_mock();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["source"], "remote");
    assert_eq!(body["dataset_rows"], 0);

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "unhealthy",
        "Status should be 'healthy' or 'unhealthy', got '{}'",
        status
    );
}

/// Test /health/ready follows the last data source check.
///
/// Kept in one test so the transitions on the shared registry run in order.
#[tokio::test]
async fn test_ready_follows_source_check() {
    let cleaned = fixtures::cleaned();
    let dataset_source: SharedSource = Arc::new(DatasetSource::new(
        SourceKind::Csv,
        cleaned.dataset,
        Some(cleaned.report),
    ));
    let remote = RemoteSource::new(closed_upstream().await, Duration::from_secs(1))
        .expect("Failed to create remote source");

    let server = TestServer::new(router(AppState::new(dataset_source.clone())))
        .expect("Failed to create test server");

    dataset_source.check().await.expect("dataset check");
    assert_eq!(server.get("/health/ready").await.status_code(), StatusCode::OK);

    assert!(remote.check().await.is_err());
    assert_eq!(
        server.get("/health/ready").await.status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "unhealthy");

    dataset_source.check().await.expect("dataset check");
    assert_eq!(server.get("/health/ready").await.status_code(), StatusCode::OK);
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::with_dataset();
    ctx.server().get("/health/live").await.assert_status_ok();
}

/// Test /metrics counts dashboard requests
#[tokio::test]
async fn test_metrics_endpoint() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    server.get("/api/dashboard").await.assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["dashboard_requests"].as_u64().unwrap() >= 1);
    assert!(body.get("upstream_errors").is_some());
    assert!(body.get("summary_latency_mean_ms").is_some());
}
