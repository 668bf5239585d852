//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use telemetry::{metrics, HealthReport};
use tracing::{error, warn};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub source: String,
    pub dataset_rows: u64,
    #[serde(flatten)]
    pub report: HealthReport,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error with a stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_001", msg)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.response = self.response.with_details(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metrics().request_errors.inc();
        (self.status, Json(self.response)).into_response()
    }
}

impl From<analytics_core::Error> for ApiError {
    fn from(err: analytics_core::Error) -> Self {
        use analytics_core::Error;

        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &err {
            Error::Upstream { code, message, .. } => {
                warn!(code = *code, error = %message, "Upstream failure surfaced to client");
                ApiError::with_code(status, *code, message)
            }
            Error::Filter { code, message, .. } => ApiError::with_code(status, *code, message),
            Error::Data { code, message, .. } => {
                if status.is_server_error() {
                    error!(code = *code, error = %message, "Dataset error");
                }
                ApiError::with_code(status, *code, message)
            }
            Error::Validation(msg) => ApiError::bad_request("Validation failed")
                .with_details(vec![msg.clone()]),
            _ => {
                error!(error = %err, "Internal error");
                ApiError::internal(err.to_string())
            }
        }
    }
}
