//! Source selection and construction.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use analytics_core::error::DataErrorCode;
use analytics_core::{Error, Result};
use pipeline::{CleanerConfig, GeneratorConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset_source::DatasetSource;
use crate::remote::RemoteSource;
use crate::source::{SharedSource, SourceKind};

/// Which source to build and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Directory of CSV exports (csv)
    pub raw_dir: PathBuf,
    /// Base URL of the upstream dashboard (remote)
    pub upstream_url: String,
    /// Request timeout for the upstream fetch
    pub timeout_secs: u64,
    /// Host whose referrers are internal navigation
    pub site_host: String,
    /// Synthetic data settings (mock)
    pub mock: GeneratorConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Mock,
            raw_dir: PathBuf::from("data/raw"),
            upstream_url: String::new(),
            timeout_secs: 10,
            site_host: CleanerConfig::default().site_host,
            mock: GeneratorConfig::default(),
        }
    }
}

impl SourceConfig {
    fn cleaner(&self) -> CleanerConfig {
        CleanerConfig {
            site_host: self.site_host.clone(),
        }
    }
}

/// Builds the configured source.
///
/// CSV loading runs on the blocking pool.
pub async fn build_source(config: &SourceConfig) -> Result<SharedSource> {
    info!(kind = %config.kind, "Building data source");

    let source: SharedSource = match config.kind {
        SourceKind::Mock => Arc::new(DatasetSource::synthetic(&config.mock, config.cleaner())),
        SourceKind::Csv => {
            let dir = config.raw_dir.clone();
            let cleaner = config.cleaner();
            let source = tokio::task::spawn_blocking(move || DatasetSource::from_csv_dir(dir, cleaner))
                .await
                .map_err(|e| {
                    Error::data(DataErrorCode::LoadFailed, format!("loader task failed: {}", e))
                })??;
            Arc::new(source)
        }
        SourceKind::Remote => Arc::new(RemoteSource::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )?),
    };

    Ok(source)
}
