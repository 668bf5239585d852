//! Per-tab analysis endpoints over the local dataset.
//!
//! These slice rows directly, so they answer 501 (`DATA_002`) when the
//! service is backed by a remote summary.

use analytics_core::breakdown::{
    aov_by_category, conversion_by, CategoryAov, ConversionBreakdown,
};
use analytics_core::error::DataErrorCode;
use analytics_core::funnel::{build_funnel, FunnelStep};
use analytics_core::trends::{
    refund_analysis, revenue_trend, sessions_trend, PeriodStats, RefundAnalysis,
};
use analytics_core::{Dimension, Error};
use axum::{
    extract::{Path, State},
    Json,
};
use pipeline::CleaningReport;
use telemetry::metrics;

use crate::extractors::AnalysisQuery;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/funnel
pub async fn funnel_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<Vec<FunnelStep>>, ApiError> {
    metrics().analysis_requests.inc();
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(build_funnel(&view)))
}

/// GET /api/conversion/:dimension - `channel` or `device`.
pub async fn conversion_handler(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    query: AnalysisQuery,
) -> Result<Json<Vec<ConversionBreakdown>>, ApiError> {
    metrics().analysis_requests.inc();
    let dimension = Dimension::parse(&dimension)?;
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(conversion_by(&view, dimension)))
}

/// GET /api/aov/category - average order value per product category.
pub async fn aov_by_category_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<Vec<CategoryAov>>, ApiError> {
    metrics().analysis_requests.inc();
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(aov_by_category(&view)))
}

/// GET /api/trends/sessions - sessions and pageviews per period.
pub async fn sessions_trend_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<Vec<PeriodStats>>, ApiError> {
    metrics().analysis_requests.inc();
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(sessions_trend(&view, query.granularity)))
}

/// GET /api/trends/revenue - orders, revenue and AOV per period.
pub async fn revenue_trend_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<Vec<PeriodStats>>, ApiError> {
    metrics().analysis_requests.inc();
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(revenue_trend(&view, query.granularity)))
}

/// GET /api/refunds - refunds by reason and over time.
pub async fn refunds_handler(
    State(state): State<AppState>,
    query: AnalysisQuery,
) -> Result<Json<RefundAnalysis>, ApiError> {
    metrics().analysis_requests.inc();
    let dataset = state.dataset()?;
    let view = dataset.view(&query.filter);
    Ok(Json(refund_analysis(&view, query.granularity)))
}

/// GET /api/report - what the cleaner removed at startup.
pub async fn report_handler(
    State(state): State<AppState>,
) -> Result<Json<CleaningReport>, ApiError> {
    metrics().analysis_requests.inc();
    let report = state.source.cleaning_report().ok_or_else(|| {
        Error::data(
            DataErrorCode::Unavailable,
            format!("{} source has no cleaning report", state.source.kind()),
        )
    })?;
    Ok(Json(report))
}
