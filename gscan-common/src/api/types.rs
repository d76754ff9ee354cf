//! Shared API request/response types
//!
//! Used by gscan-lp (which serves them) and gscan-sc (which consumes them).

use serde::{Deserialize, Serialize};

// ========================================
// Error Messages
// ========================================

/// 400 body message for a missing or empty barcode
pub const BARCODE_REQUIRED: &str = "Barcode is required";

/// 404 body message when the database answers "not found" at the transport level
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// 404 body message when the database payload carries no product
pub const PRODUCT_NOT_IN_DATABASE: &str = "Product not found in database";

/// 500 body message for upstream and internal failures
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

// ========================================
// Request Types
// ========================================

/// Product lookup request body
///
/// # Examples
///
/// ```
/// use gscan_common::api::types::LookupRequest;
///
/// let body = serde_json::to_string(&LookupRequest::new("3017620422003")).unwrap();
/// assert_eq!(body, r#"{"barcode":"3017620422003"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupRequest {
    pub barcode: String,
}

impl LookupRequest {
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
        }
    }
}

// ========================================
// Response Types
// ========================================

/// Error response body for every non-200 lookup answer
///
/// `details` is present on 500 responses only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Health check response: status, module name and version
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
