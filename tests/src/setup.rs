//! Common test setup functions.

use std::sync::Arc;
use std::time::Duration;

use analytics_core::{DashboardFilter, DashboardSummary};
use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use dashboard_service::{DatasetSource, RemoteSource, SourceKind};

use crate::fixtures;
use crate::mocks::MockSource;

/// Test context around the real router.
///
/// - `with_dataset` serves the cleaned fixture export
/// - `with_mock` serves a canned summary through `MockSource`
/// - `with_remote` fetches from a real upstream URL
pub struct TestContext {
    pub router: Router,
    pub mock: Option<MockSource>,
}

impl TestContext {
    pub fn with_dataset() -> Self {
        let cleaned = fixtures::cleaned();
        let source = DatasetSource::new(SourceKind::Csv, cleaned.dataset, Some(cleaned.report));
        Self {
            router: router(AppState::from_source(source)),
            mock: None,
        }
    }

    pub fn with_mock() -> Self {
        let cleaned = fixtures::cleaned();
        let summary = DashboardSummary::compute(&cleaned.dataset.view(&DashboardFilter::all()));
        let mock = MockSource::new(summary);
        Self {
            router: router(AppState::new(Arc::new(mock.clone()))),
            mock: Some(mock),
        }
    }

    pub fn with_remote(base_url: &str) -> Self {
        let source = RemoteSource::new(base_url, Duration::from_secs(2))
            .expect("Failed to create remote source");
        Self {
            router: router(AppState::from_source(source)),
            mock: None,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// Set the mock source to fail (for error testing).
    pub fn set_source_failure(&self, should_fail: bool) {
        if let Some(mock) = &self.mock {
            mock.set_should_fail(should_fail);
        }
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn closed_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}", addr)
}
