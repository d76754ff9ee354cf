//! Raw Open Food Facts record → [`ProductInfo`]
//!
//! Total over absent fields: every missing optional value maps to `None` or
//! an empty collection. The only fabricated values are the "Unknown Product"
//! and "Unknown Brand" sentinels.

use crate::upstream::OffProduct;
use gscan_common::product::{UNKNOWN_BRAND, UNKNOWN_PRODUCT};
use gscan_common::{EcoScore, EcoScoreGrade, NutrientLevel, Nutriments, ProductInfo};
use std::collections::BTreeMap;
use tracing::debug;

/// Build the client-facing record for `barcode` from a raw product
pub fn normalize_product(barcode: &str, product: OffProduct) -> ProductInfo {
    let nutriments = product.nutriments.unwrap_or_default();

    ProductInfo {
        barcode: barcode.to_string(),
        product_name: non_empty(product.product_name)
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        brand: non_empty(product.brands).unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
        quantity: product.quantity,
        image_url: non_empty(product.image_front_url),
        ingredients_text: product.ingredients_text,
        allergens: product.allergens_hierarchy.unwrap_or_default(),
        nutrient_levels: nutrient_levels(barcode, product.nutrient_levels.unwrap_or_default()),
        nutriments: Nutriments {
            energy_kcal: nutriments.energy_kcal_100g,
            fat: nutriments.fat_100g,
            carbohydrates: nutriments.carbohydrates_100g,
            proteins: nutriments.proteins_100g,
        },
        eco_score: EcoScore::from_grade(EcoScoreGrade::parse(product.ecoscore_grade.as_deref())),
    }
}

/// Empty strings count as absent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Keep levels within low/moderate/high; drop the rest
fn nutrient_levels(barcode: &str, raw: BTreeMap<String, String>) -> BTreeMap<String, NutrientLevel> {
    raw.into_iter()
        .filter_map(|(nutrient, level)| match NutrientLevel::parse(&level) {
            Some(parsed) => Some((nutrient, parsed)),
            None => {
                debug!(barcode = %barcode, nutrient = %nutrient, level = %level, "Dropping unrecognized nutrient level");
                None
            }
        })
        .collect()
}
