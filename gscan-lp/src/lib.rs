//! gscan-lp library - Lookup Proxy
//!
//! Accepts a barcode, queries the product database and answers with a
//! normalized `ProductInfo` carrying the derived eco-score rating.

use axum::Router;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod normalize;
pub mod upstream;

pub use crate::error::{ApiResult, ErrorKind, LookupError};
pub use crate::upstream::{OpenFoodFactsClient, ProductSource};

/// Application state shared across HTTP handlers
///
/// Holds no per-request mutable state; concurrent lookups are independent.
#[derive(Clone)]
pub struct AppState {
    /// Product database the proxy forwards lookups to
    pub source: Arc<dyn ProductSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        Self { source }
    }
}

/// Build application router
///
/// - `POST /api/product-info`: barcode lookup
/// - `GET /health`: health check
pub fn build_router(state: AppState) -> Router {
    use tower_http::catch_panic::CatchPanicLayer;
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    Router::new()
        .merge(api::product_routes())
        .merge(api::health_routes())
        .layer(CatchPanicLayer::custom(api::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
