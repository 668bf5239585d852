//! Application state shared across handlers.

use std::sync::Arc;

use analytics_core::{error::DataErrorCode, Dataset, Error};
use dashboard_service::{DashboardSource, SharedSource};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Summary source (dataset-backed in production, mock in tests)
    pub source: SharedSource,
}

impl AppState {
    pub fn new(source: SharedSource) -> Self {
        Self { source }
    }

    pub fn from_source(source: impl DashboardSource + 'static) -> Self {
        Self::new(Arc::new(source))
    }

    /// The local dataset, for endpoints that slice rows directly.
    ///
    /// A remote source only serves the finished summary.
    pub fn dataset(&self) -> Result<Arc<Dataset>, Error> {
        self.source.dataset().ok_or_else(|| {
            Error::data(
                DataErrorCode::Unavailable,
                format!(
                    "{} source serves only the dashboard summary",
                    self.source.kind()
                ),
            )
        })
    }
}
