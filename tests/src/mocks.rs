//! Mock implementations for testing.

use std::sync::Arc;

use analytics_core::error::UpstreamErrorCode;
use analytics_core::{DashboardFilter, DashboardSummary, Error, Result};
use async_trait::async_trait;
use dashboard_service::{DashboardSource, SourceKind};
use parking_lot::Mutex;

/// Mock source that serves a canned summary and records requested filters.
///
/// This implements the same `DashboardSource` trait as the real sources,
/// so handlers run their production code paths.
#[derive(Clone)]
pub struct MockSource {
    summary: DashboardSummary,
    /// Filters passed to `summary`, in order.
    requests: Arc<Mutex<Vec<DashboardFilter>>>,
    /// Simulate upstream failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockSource {
    pub fn new(summary: DashboardSummary) -> Self {
        Self {
            summary,
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Get all filters the source was asked for.
    pub fn requests(&self) -> Vec<DashboardFilter> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

#[async_trait]
impl DashboardSource for MockSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary> {
        self.requests.lock().push(filter.clone());
        if *self.should_fail.lock() {
            return Err(Error::upstream(
                UpstreamErrorCode::Network,
                "mock upstream unavailable",
            ));
        }
        Ok(self.summary.clone())
    }

    async fn check(&self) -> Result<()> {
        self.summary(&DashboardFilter::all()).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn summary() -> DashboardSummary {
        let cleaned = fixtures::cleaned();
        DashboardSummary::compute(&cleaned.dataset.view(&DashboardFilter::all()))
    }

    #[tokio::test]
    async fn test_mock_source_records_requests() {
        let mock = MockSource::new(summary());
        let filter = DashboardFilter::all().with_channel("Email");

        let served = mock.summary(&filter).await.unwrap();
        assert_eq!(served.traffic.total_sessions, 4);
        assert_eq!(mock.requests(), vec![filter]);
    }

    #[tokio::test]
    async fn test_mock_source_failure_mode() {
        let mock = MockSource::new(summary());
        mock.set_should_fail(true);

        let err = mock.summary(&DashboardFilter::all()).await.unwrap_err();
        assert_eq!(err.error_code(), Some("UPSTREAM_001"));
        assert!(mock.check().await.is_err());
        assert_eq!(mock.request_count(), 2);
    }
}
