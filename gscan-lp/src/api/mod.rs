//! HTTP API handlers for gscan-lp

pub mod health;
pub mod product_info;

pub use health::health_routes;
pub use product_info::{handle_panic, product_info, product_routes};
