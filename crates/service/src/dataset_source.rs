//! Summaries computed from an in-memory dataset.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use analytics_core::{DashboardFilter, DashboardSummary, Dataset, Result};
use async_trait::async_trait;
use pipeline::{CleanedData, CleanerConfig, CleaningReport, GeneratorConfig};
use telemetry::{health, metrics};
use tracing::{debug, info};

use crate::source::{DashboardSource, SourceKind};

/// Serves summaries from a dataset loaded once at startup.
pub struct DatasetSource {
    kind: SourceKind,
    dataset: Arc<Dataset>,
    report: Option<CleaningReport>,
}

impl DatasetSource {
    pub fn new(kind: SourceKind, dataset: Dataset, report: Option<CleaningReport>) -> Self {
        Self {
            kind,
            dataset: Arc::new(dataset),
            report,
        }
    }

    fn from_cleaned(kind: SourceKind, cleaned: CleanedData) -> Self {
        Self::new(kind, cleaned.dataset, Some(cleaned.report))
    }

    /// Loads and cleans CSV exports from `dir`.
    pub fn from_csv_dir(dir: impl AsRef<Path>, cleaner: CleanerConfig) -> Result<Self> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "Loading dataset from CSV exports");
        let cleaned = pipeline::load_and_clean(dir, cleaner)?;
        Ok(Self::from_cleaned(SourceKind::Csv, cleaned))
    }

    /// Generates and cleans seeded mock data.
    pub fn synthetic(generator: &GeneratorConfig, cleaner: CleanerConfig) -> Self {
        info!(seed = generator.seed, sessions = generator.sessions, "Generating mock dataset");
        Self::from_cleaned(SourceKind::Mock, pipeline::synthetic(generator, cleaner))
    }
}

#[async_trait]
impl DashboardSource for DatasetSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary> {
        let start = Instant::now();
        let view = self.dataset.view(filter);
        let summary = DashboardSummary::compute(&view);

        let elapsed = start.elapsed().as_millis() as u64;
        metrics().summary_latency_ms.observe(elapsed);
        debug!(
            sessions = view.sessions.len(),
            orders = view.orders.len(),
            elapsed_ms = elapsed,
            "Computed summary"
        );
        Ok(summary)
    }

    async fn check(&self) -> Result<()> {
        let rows = self.dataset.row_count();
        health()
            .data_source
            .set_healthy(Some(format!("{} source, {} rows", self.kind, rows)));
        Ok(())
    }

    fn dataset(&self) -> Option<Arc<Dataset>> {
        Some(self.dataset.clone())
    }

    fn cleaning_report(&self) -> Option<CleaningReport> {
        self.report.clone()
    }
}
