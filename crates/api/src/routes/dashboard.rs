//! The dashboard summary endpoint.

use std::time::Instant;

use analytics_core::DashboardSummary;
use axum::{extract::State, Json};
use telemetry::metrics;
use tracing::debug;

use crate::extractors::AnalysisQuery;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/dashboard - Fixed-shape summary for the Overview tab.
///
/// Upstream failures are returned as 502 with no partial body.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<DashboardSummary>, ApiError> {
    let start = Instant::now();
    metrics().dashboard_requests.inc();

    let summary = state.source.summary(&query.filter).await?;

    debug!(
        source = %state.source.kind(),
        sessions = summary.traffic.total_sessions,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Served dashboard summary"
    );
    Ok(Json(summary))
}
