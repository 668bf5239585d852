//! Tests for the dashboard and analysis endpoints.
//!
//! Served from the cleaned fixture export (see `fixtures`), so every
//! number below can be checked by hand.

use axum::{routing::get, Json, Router};
use axum_test::TestServer;
use integration_tests::{fixtures, setup::{spawn_upstream, TestContext}};

/// The summary has every section and hand-checked totals.
#[tokio::test]
async fn test_dashboard_summary_from_dataset() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/dashboard").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    for key in fixtures::SUMMARY_KEYS {
        assert!(body.get(*key).is_some(), "Summary should have '{}'", key);
    }

    assert_eq!(body["traffic"]["total_sessions"], 4);
    assert_eq!(body["traffic"]["unique_users"], 3);
    assert_eq!(body["traffic"]["sessions_by_channel"]["Email"], 2);
    assert_eq!(body["traffic"]["sessions_by_channel"]["Direct"], 2);
    assert_eq!(body["conversion"]["overall_conversion_rate"], 50.0);
    assert_eq!(body["conversion"]["total_conversions"], 2);
    assert_eq!(body["revenue"]["total_revenue"], 150.0);
    assert_eq!(body["revenue"]["average_order_value"], 75.0);
    assert_eq!(body["revenue"]["revenue_per_session"], 37.5);
    assert_eq!(body["quality"]["overall_refund_rate"], 50.0);
    assert_eq!(body["quality"]["total_refunds"], 1);
    assert_eq!(body["quality"]["refund_value"], 20.0);
    assert_eq!(body["quality"]["repeat_customer_rate"], 25.0);
}

/// Channel and date filters narrow every section.
#[tokio::test]
async fn test_dashboard_filters() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("channel", "Email")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total_sessions"], 2);
    assert_eq!(body["revenue"]["total_revenue"], 100.0);
    assert_eq!(body["conversion"]["overall_conversion_rate"], 50.0);

    let response = server
        .get("/api/dashboard")
        .add_query_param("start", "2024-01-02")
        .add_query_param("end", "2024-01-03")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total_sessions"], 2);
    assert_eq!(body["conversion"]["total_conversions"], 1);
    assert_eq!(body["revenue"]["total_revenue"], 50.0);
}

/// A filter that matches nothing yields zeros, not errors.
#[tokio::test]
async fn test_dashboard_empty_selection() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("device", "Tablet")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total_sessions"], 0);
    assert_eq!(body["conversion"]["overall_conversion_rate"], 0.0);
    assert_eq!(body["revenue"]["average_order_value"], 0.0);
}

/// The mock source receives the parsed filter.
#[tokio::test]
async fn test_dashboard_passes_filter_to_source() {
    let ctx = TestContext::with_mock();
    let server = ctx.server();

    server
        .get("/api/dashboard")
        .add_query_param("channel", "Email")
        .add_query_param("device", "Mobile")
        .await
        .assert_status_ok();

    let requests = ctx.mock.as_ref().unwrap().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].channel.as_deref(), Some("Email"));
    assert_eq!(requests[0].device.as_deref(), Some("Mobile"));
}

/// One backend can serve as the remote source of another.
#[tokio::test]
async fn test_remote_source_relays_upstream_summary() {
    let upstream = TestContext::with_dataset();
    let base_url = spawn_upstream(upstream.router.clone()).await;

    let ctx = TestContext::with_remote(&base_url);
    let server = ctx.server();

    let response = server
        .get("/api/dashboard")
        .add_query_param("channel", "Direct")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total_sessions"], 2);
    assert_eq!(body["revenue"]["total_revenue"], 50.0);
}

/// Each upstream-backed request is exactly one fetch.
#[tokio::test]
async fn test_remote_source_fetches_once_per_request() {
    let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();
    let cleaned = fixtures::cleaned();
    let summary = analytics_core::DashboardSummary::compute(
        &cleaned.dataset.view(&analytics_core::DashboardFilter::all()),
    );
    let upstream = Router::new().route(
        "/api/dashboard",
        get(move || {
            let counter = counter.clone();
            let summary = summary.clone();
            async move {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Json(summary)
            }
        }),
    );
    let base_url = spawn_upstream(upstream).await;

    let server = TestServer::new(TestContext::with_remote(&base_url).router).unwrap();
    server.get("/api/dashboard").await.assert_status_ok();
    server.get("/api/dashboard").await.assert_status_ok();

    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
}

/// Funnel counts never increase down the stages.
#[tokio::test]
async fn test_funnel() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/funnel").await;
    response.assert_status_ok();
    let steps: Vec<serde_json::Value> = response.json();

    assert_eq!(steps.len(), 6);
    assert_eq!(steps[0]["label"], "Sessions");
    assert_eq!(steps[0]["sessions"], 4);
    assert_eq!(steps[5]["label"], "Purchase");
    assert_eq!(steps[5]["sessions"], 2);
    let counts: Vec<u64> = steps.iter().map(|s| s["sessions"].as_u64().unwrap()).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_conversion_by_dimension() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/conversion/device").await;
    response.assert_status_ok();
    let rows: Vec<serde_json::Value> = response.json();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["key"], "Desktop");
    assert_eq!(rows[0]["conversion_rate"], 100.0);
    assert_eq!(rows[1]["key"], "Mobile");
    assert_eq!(rows[1]["conversion_rate"], 0.0);
}

#[tokio::test]
async fn test_aov_by_category() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/aov/category").await;
    response.assert_status_ok();
    let rows: Vec<serde_json::Value> = response.json();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["category"], "Bears");
    assert_eq!(rows[0]["average_order_value"], 100.0);
    assert_eq!(rows[1]["category"], "Gifts");
    assert_eq!(rows[1]["average_order_value"], 50.0);

    let body: serde_json::Value = server.get("/api/dashboard").await.json();
    assert_eq!(body["revenue"]["aov_by_category"][0]["category"], "Bears");
}

#[tokio::test]
async fn test_trends() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/trends/sessions").await;
    response.assert_status_ok();
    let daily: Vec<serde_json::Value> = response.json();
    assert_eq!(daily.len(), 4);
    assert_eq!(daily[0]["period"], "2024-01-01");

    // 2024-01-01 is a Monday: the first three sessions share a week.
    let response = server
        .get("/api/trends/sessions")
        .add_query_param("freq", "weekly")
        .await;
    let weekly: Vec<serde_json::Value> = response.json();
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0]["count"], 3);

    let response = server
        .get("/api/trends/revenue")
        .add_query_param("freq", "monthly")
        .await;
    response.assert_status_ok();
    let monthly: Vec<serde_json::Value> = response.json();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["count"], 2);
    assert_eq!(monthly[0]["sum"], 150.0);
    assert_eq!(monthly[0]["mean"], 75.0);
}

#[tokio::test]
async fn test_refunds() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/refunds").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_refunds"], 1);
    assert_eq!(body["total_value"], 20.0);
    assert_eq!(body["by_reason"][0]["reason"], "Defective");
}

/// Refund analysis selects refunds by refund date, not order date.
#[tokio::test]
async fn test_refunds_follow_refund_date() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    // O1 was placed on Jan 1 and refunded on Jan 5.
    let response = server
        .get("/api/refunds")
        .add_query_param("start", "2024-01-01")
        .add_query_param("end", "2024-01-03")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_refunds"], 0);
    assert!(body["trend"].as_array().unwrap().is_empty());

    let response = server
        .get("/api/refunds")
        .add_query_param("start", "2024-01-04")
        .add_query_param("end", "2024-01-06")
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_refunds"], 1);
    assert_eq!(body["trend"][0]["period"], "2024-01-05");
}

/// The cleaning report shows nothing was dropped from the fixture.
#[tokio::test]
async fn test_cleaning_report() {
    let ctx = TestContext::with_dataset();
    let server = ctx.server();

    let response = server.get("/api/report").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["sessions_in"], 4);
    assert_eq!(body["sessions_out"], 4);
    assert_eq!(body["refunds_out"], 1);
}

/// CSV exports on disk load into the same numbers as the in-memory fixture.
#[tokio::test]
async fn test_csv_source_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_csv_dir(dir.path());

    let config = dashboard_service::SourceConfig {
        kind: dashboard_service::SourceKind::Csv,
        raw_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let source = dashboard_service::build_source(&config).await.unwrap();
    let server = TestServer::new(api::router(api::AppState::new(source))).unwrap();

    let response = server.get("/api/dashboard").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["traffic"]["total_sessions"], 4);
    assert_eq!(body["revenue"]["total_revenue"], 150.0);
}
