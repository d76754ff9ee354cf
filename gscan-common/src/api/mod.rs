//! API types shared by the lookup proxy and its clients

pub mod types;

pub use types::{ErrorResponse, HealthResponse, LookupRequest};

/// Product lookup endpoint
pub const PRODUCT_INFO_PATH: &str = "/api/product-info";

/// Health check endpoint
pub const HEALTH_PATH: &str = "/health";
