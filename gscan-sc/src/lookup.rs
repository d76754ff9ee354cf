//! Product lookup seam between the controller and the lookup proxy

use async_trait::async_trait;
use gscan_common::ProductInfo;
use thiserror::Error;

/// Message shown when the proxy answers with an error but no usable body
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get product data.";

/// Message shown when a lookup exceeds the controller's timeout
pub const TIMEOUT_MESSAGE: &str = "Lookup timed out";

/// Client-side lookup failure
///
/// Every variant collapses into the session's `Error(message)` state; the
/// `Display` text is that message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// Proxy answered with a non-2xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No usable answer from the proxy
    #[error("{0}")]
    Transport(String),

    #[error("Lookup timed out")]
    TimedOut,
}

/// Resolves a barcode to a product
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupFailure>;
}
