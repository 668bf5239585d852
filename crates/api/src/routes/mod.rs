//! API routes.

pub mod analysis;
pub mod dashboard;
pub mod health;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/dashboard", get(dashboard::dashboard_handler))
        .route("/api/funnel", get(analysis::funnel_handler))
        .route("/api/conversion/:dimension", get(analysis::conversion_handler))
        .route("/api/aov/category", get(analysis::aov_by_category_handler))
        .route("/api/trends/sessions", get(analysis::sessions_trend_handler))
        .route("/api/trends/revenue", get(analysis::revenue_trend_handler))
        .route("/api/refunds", get(analysis::refunds_handler))
        .route("/api/report", get(analysis::report_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
