//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use analytics_core::{DashboardFilter, Error, TimeGranularity};
use serde::Deserialize;

use crate::response::ApiError;

/// Raw query parameters shared by every dashboard endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub channel: Option<String>,
    pub device: Option<String>,
    pub freq: Option<String>,
}

/// Validated filter and trend granularity from the query string.
#[derive(Debug, Clone, Default)]
pub struct AnalysisQuery {
    pub filter: DashboardFilter,
    pub granularity: TimeGranularity,
}

impl AnalysisQuery {
    pub fn from_params(params: &FilterParams) -> Result<Self, ApiError> {
        let filter = DashboardFilter::parse(
            params.start.as_deref(),
            params.end.as_deref(),
            params.channel.as_deref(),
            params.device.as_deref(),
        )?;

        let granularity = match params.freq.as_deref().map(str::trim) {
            Some(freq) if !freq.is_empty() => TimeGranularity::parse(freq)?,
            _ => TimeGranularity::default(),
        };

        Ok(Self {
            filter,
            granularity,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AnalysisQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<FilterParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::from(Error::filter(e.body_text())))?;
        Self::from_params(&params)
    }
}
