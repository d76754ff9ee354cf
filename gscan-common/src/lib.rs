//! # GreenScan Common Library
//!
//! Shared code for the GreenScan crates including:
//! - Product data model (`ProductInfo`) returned by the lookup proxy
//! - Eco-score grade to label/color mapping
//! - API request/response types
//! - Configuration loading

pub mod api;
pub mod config;
pub mod eco_score;
pub mod error;
pub mod product;

pub use eco_score::{EcoScore, EcoScoreGrade, EcoScoreLabel, ScoreColor};
pub use error::{Error, Result};
pub use product::{NutrientLevel, Nutriments, ProductInfo};
