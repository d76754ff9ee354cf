//! Normalized product record returned by the lookup proxy

use crate::eco_score::EcoScore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product name used when the database has none
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Brand used when the database has none
pub const UNKNOWN_BRAND: &str = "Unknown Brand";

/// Nutriment keys carried in [`Nutriments`], in display order
pub const NUTRIMENT_KEYS: [&str; 4] = ["energy-kcal", "fat", "carbohydrates", "proteins"];

/// Product information for one scanned barcode
///
/// Built fresh per lookup and never mutated afterwards. Serialized with
/// camelCase field names; the eco-score fields are flattened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    /// Scanned identifier, opaque
    pub barcode: String,

    #[serde(default = "unknown_product")]
    pub product_name: String,

    #[serde(default = "unknown_brand")]
    pub brand: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    /// Front-of-pack image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients_text: Option<String>,

    /// Allergen taxonomy tags in upstream order (e.g. `en:milk`)
    #[serde(default)]
    pub allergens: Vec<String>,

    /// Nutrient name → level (e.g. `salt` → `low`)
    #[serde(default)]
    pub nutrient_levels: BTreeMap<String, NutrientLevel>,

    /// Per-100g values
    #[serde(default)]
    pub nutriments: Nutriments,

    #[serde(flatten)]
    pub eco_score: EcoScore,
}

fn unknown_product() -> String {
    UNKNOWN_PRODUCT.to_string()
}

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_string()
}

/// Nutrient level bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientLevel {
    Low,
    Moderate,
    High,
}

impl NutrientLevel {
    /// Parse an upstream level; `None` for anything outside low/moderate/high
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(NutrientLevel::Low),
            "moderate" => Some(NutrientLevel::Moderate),
            "high" => Some(NutrientLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientLevel::Low => "low",
            NutrientLevel::Moderate => "moderate",
            NutrientLevel::High => "high",
        }
    }
}

/// Per-100g nutriment values; a key is omitted when the database omits it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal", default, skip_serializing_if = "Option::is_none")]
    pub energy_kcal: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proteins: Option<f64>,
}

impl Nutriments {
    /// Value by wire key (see [`NUTRIMENT_KEYS`])
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "energy-kcal" => self.energy_kcal,
            "fat" => self.fat,
            "carbohydrates" => self.carbohydrates,
            "proteins" => self.proteins,
            _ => None,
        }
    }

    /// Present values in [`NUTRIMENT_KEYS`] order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        NUTRIMENT_KEYS
            .iter()
            .filter_map(move |key| self.get(key).map(|value| (*key, value)))
    }
}
