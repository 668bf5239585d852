//! Unified error types for the dashboard backend.
//!
//! Error codes:
//! - UPSTREAM_001-002: Remote summary fetch errors
//! - FILTER_001: Invalid dashboard filter
//! - DATA_001-002: Dataset errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream fetch error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorCode {
    /// UPSTREAM_001: Request failed or returned a non-success status
    Network,
    /// UPSTREAM_002: Response body could not be decoded
    Parse,
}

impl UpstreamErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network => "UPSTREAM_001",
            Self::Parse => "UPSTREAM_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        502
    }
}

/// Filter error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorCode {
    /// FILTER_001: Bad date, inverted range, unknown dimension or frequency
    Invalid,
}

impl FilterErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid => "FILTER_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Dataset error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorCode {
    /// DATA_001: Export files missing or unreadable
    LoadFailed,
    /// DATA_002: Operation needs a local dataset
    Unavailable,
}

impl DataErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LoadFailed => "DATA_001",
            Self::Unavailable => "DATA_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::LoadFailed => 500,
            Self::Unavailable => 501,
        }
    }
}

/// Unified error type for the dashboard backend.
#[derive(Debug, Error)]
pub enum Error {
    /// Upstream fetch error with code.
    #[error("[{code}] {message}")]
    Upstream {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Filter error with code.
    #[error("[{code}] {message}")]
    Filter {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Dataset error with code.
    #[error("[{code}] {message}")]
    Data {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an upstream fetch error.
    pub fn upstream(code: UpstreamErrorCode, msg: impl Into<String>) -> Self {
        Self::Upstream {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an invalid filter error.
    pub fn filter(msg: impl Into<String>) -> Self {
        let code = FilterErrorCode::Invalid;
        Self::Filter {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a dataset error.
    pub fn data(code: DataErrorCode, msg: impl Into<String>) -> Self {
        Self::Data {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Upstream { http_status, .. } => *http_status,
            Self::Filter { http_status, .. } => *http_status,
            Self::Data { http_status, .. } => *http_status,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Upstream { code, .. } => Some(code),
            Self::Filter { code, .. } => Some(code),
            Self::Data { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this error came from the remote summary fetch.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
