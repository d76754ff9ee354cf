//! Product database access
//!
//! [`ProductSource`] is the seam between the HTTP handler and the external
//! product database. The production implementation is
//! [`OpenFoodFactsClient`]; tests substitute in-memory sources.

pub mod off_client;
pub mod types;

pub use off_client::OpenFoodFactsClient;
pub use types::{OffNutriments, OffProduct, OffResponse};

use crate::error::LookupError;
use async_trait::async_trait;

/// Read-only product lookup by barcode
///
/// Implementations return `LookupError::NotFound` for any not-found signal,
/// `LookupError::Upstream` for transport and non-2xx failures and
/// `LookupError::Internal` for payloads they cannot decode.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &'static str;

    /// Fetch the raw product record for one barcode
    async fn fetch_product(&self, barcode: &str) -> Result<OffProduct, LookupError>;
}
