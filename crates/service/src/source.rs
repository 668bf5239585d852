//! The seam between the HTTP layer and where summaries come from.

use std::fmt;
use std::sync::Arc;

use analytics_core::{DashboardFilter, DashboardSummary, Dataset, Result};
use async_trait::async_trait;
use pipeline::CleaningReport;
use serde::{Deserialize, Serialize};

/// Where the dashboard gets its numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Seeded synthetic exports
    #[default]
    Mock,
    /// CSV exports from a directory
    Csv,
    /// Another dashboard's `/api/dashboard`
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Csv => "csv",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = analytics_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "synthetic" => Ok(Self::Mock),
            "csv" | "file" => Ok(Self::Csv),
            "remote" | "http" => Ok(Self::Remote),
            other => Err(analytics_core::Error::validation(format!(
                "unknown source kind '{}'",
                other
            ))),
        }
    }
}

/// Produces dashboard summaries.
///
/// A source either holds a local [`Dataset`] or fetches the finished
/// summary over HTTP. Remote failures are returned as-is: no retries, no
/// cached or partial fallback.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Summary for `filter`.
    async fn summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary>;

    /// Verifies the source can serve, updating the health registry.
    async fn check(&self) -> Result<()>;

    /// Local rows, when the source has them.
    fn dataset(&self) -> Option<Arc<Dataset>> {
        None
    }

    /// How the local rows were cleaned, when known.
    fn cleaning_report(&self) -> Option<CleaningReport> {
        None
    }
}

/// Shared, dynamically dispatched source.
pub type SharedSource = Arc<dyn DashboardSource>;
