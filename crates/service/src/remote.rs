//! Summaries fetched from another dashboard backend.

use std::time::{Duration, Instant};

use analytics_core::error::UpstreamErrorCode;
use analytics_core::{DashboardFilter, DashboardSummary, Error, Result};
use async_trait::async_trait;
use telemetry::{health, metrics};
use tracing::{debug, warn};

use crate::source::{DashboardSource, SourceKind};

/// Fetches `GET {base_url}/api/dashboard` once per request.
///
/// A failed fetch is logged, recorded in health and metrics, and returned to
/// the caller. Nothing is retried or cached.
#[derive(Clone)]
pub struct RemoteSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::validation("remote source needs an upstream URL"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, filter: &DashboardFilter) -> Result<DashboardSummary> {
        let url = format!("{}/api/dashboard", self.base_url);
        debug!(url = %url, "Fetching upstream summary");

        let response = self
            .http_client
            .get(&url)
            .query(&filter.to_query_pairs())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Upstream request failed");
                Error::upstream(
                    UpstreamErrorCode::Network,
                    format!("upstream unavailable: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, body = %body, "Upstream returned error");
            return Err(Error::upstream(
                UpstreamErrorCode::Network,
                format!("upstream returned {}", status),
            ));
        }

        let body = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read upstream body");
            Error::upstream(
                UpstreamErrorCode::Network,
                format!("failed to read upstream body: {}", e),
            )
        })?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse upstream summary");
            Error::upstream(
                UpstreamErrorCode::Parse,
                format!("invalid upstream summary: {}", e),
            )
        })
    }
}

#[async_trait]
impl DashboardSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary> {
        let m = metrics();
        m.upstream_fetches.inc();
        let start = Instant::now();

        let result = self.fetch(filter).await;
        m.upstream_latency_ms.observe(start.elapsed().as_millis() as u64);

        match &result {
            Ok(_) => health()
                .data_source
                .set_healthy(Some(format!("upstream {}", self.base_url))),
            Err(e) => {
                m.upstream_errors.inc();
                health().data_source.set_unhealthy(e.to_string());
            }
        }
        result
    }

    async fn check(&self) -> Result<()> {
        self.summary(&DashboardFilter::all()).await.map(|_| ())
    }
}
