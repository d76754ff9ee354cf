//! Error types for gscan-lp
//!
//! Every failure of a lookup carries a machine-readable [`ErrorKind`] and a
//! human-readable message, and converts into the JSON error body at the
//! handler boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gscan_common::api::types::{ErrorResponse, BARCODE_REQUIRED, INTERNAL_SERVER_ERROR};
use thiserror::Error;

/// Machine-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    UpstreamError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup failure
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing, empty or malformed barcode (400). No upstream call was made.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The product database has no record for the barcode (404)
    #[error("{0}")]
    NotFound(String),

    /// Transport failure or non-2xx answer from the product database
    #[error("{message}")]
    Upstream {
        /// HTTP status, `None` when no response was received
        status: Option<u16>,
        message: String,
    },

    /// Unexpected processing fault, e.g. a malformed upstream payload
    #[error("{0}")]
    Internal(String),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            LookupError::NotFound(_) => ErrorKind::NotFound,
            LookupError::Upstream { .. } => ErrorKind::UpstreamError,
            LookupError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Non-2xx, non-404 answer from the product database
    pub fn upstream_status(status: u16) -> Self {
        LookupError::Upstream {
            status: Some(status),
            message: format!("API call failed with status: {}", status),
        }
    }

    /// No usable response from the product database
    pub fn upstream_transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Upstream request timed out".to_string()
        } else {
            format!("Upstream request failed: {}", err)
        };
        LookupError::Upstream {
            status: None,
            message,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LookupError::NotFound(_) => StatusCode::NOT_FOUND,
            LookupError::Upstream { .. } | LookupError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            LookupError::InvalidRequest(_) => ErrorResponse::new(BARCODE_REQUIRED),
            LookupError::NotFound(message) => ErrorResponse::new(message),
            other => ErrorResponse::with_details(INTERNAL_SERVER_ERROR, other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, LookupError>;
