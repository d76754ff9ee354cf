//! Health check endpoint

use axum::{routing::get, Json, Router};
use gscan_common::api::{HealthResponse, HEALTH_PATH};

use crate::AppState;

/// GET /health
///
/// Returns status, module name, and version. Never touches the product
/// database.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: crate::config::MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health_check))
}
