//! Tests for error handling on the dashboard endpoints.
//!
//! Upstream failures must surface as a coded error with no partial summary.

use axum::{http::StatusCode, routing::get, Router};
use integration_tests::setup::{closed_upstream, spawn_upstream, TestContext};

/// A failing source returns 502 UPSTREAM_001 and nothing else.
#[tokio::test]
async fn test_source_failure_returns_502() {
    let ctx = TestContext::with_mock();
    let server = ctx.server();
    ctx.set_source_failure(true);

    let response = server.get("/api/dashboard").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_001");
    assert!(body.get("traffic").is_none(), "No partial summary on failure");

    // No retry: the failed request reached the source once.
    assert_eq!(ctx.mock.as_ref().unwrap().request_count(), 1);
}

/// The source recovers as soon as the upstream does.
#[tokio::test]
async fn test_source_recovers() {
    let ctx = TestContext::with_mock();
    let server = ctx.server();

    ctx.set_source_failure(true);
    server.get("/api/dashboard").await.assert_status(StatusCode::BAD_GATEWAY);

    ctx.set_source_failure(false);
    server.get("/api/dashboard").await.assert_status_ok();
}

#[tokio::test]
async fn test_unreachable_upstream_returns_502() {
    let ctx = TestContext::with_remote(&closed_upstream().await);
    let server = ctx.server();

    let response = server.get("/api/dashboard").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_001");
}

#[tokio::test]
async fn test_upstream_error_status_returns_502() {
    let upstream = Router::new().route(
        "/api/dashboard",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let ctx = TestContext::with_remote(&spawn_upstream(upstream).await);

    let response = ctx.server().get("/api/dashboard").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_001");
}

#[tokio::test]
async fn test_malformed_upstream_body_returns_502() {
    let upstream = Router::new().route("/api/dashboard", get(|| async { "[1, 2, 3]" }));
    let ctx = TestContext::with_remote(&spawn_upstream(upstream).await);

    let response = ctx.server().get("/api/dashboard").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_002");
}

/// Inverted date range returns FILTER_001
#[tokio::test]
async fn test_inverted_range_returns_400() {
    let ctx = TestContext::with_dataset();

    let response = ctx
        .server()
        .get("/api/dashboard")
        .add_query_param("start", "2024-02-01")
        .add_query_param("end", "2024-01-01")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FILTER_001");
}

#[tokio::test]
async fn test_bad_date_returns_400() {
    let ctx = TestContext::with_dataset();

    let response = ctx
        .server()
        .get("/api/funnel")
        .add_query_param("start", "last tuesday")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FILTER_001");
}

#[tokio::test]
async fn test_unknown_dimension_and_frequency() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/conversion/country").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["code"], "FILTER_001");

    let response = server
        .get("/api/trends/revenue")
        .add_query_param("freq", "hourly")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

/// Row-level analyses are not available from a remote summary.
#[tokio::test]
async fn test_analysis_on_remote_source_returns_501() {
    let ctx = TestContext::with_mock();
    let server = ctx.server();

    for path in ["/api/funnel", "/api/refunds", "/api/report"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::NOT_IMPLEMENTED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "DATA_002", "{}", path);
    }
}
