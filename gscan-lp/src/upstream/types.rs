//! Open Food Facts product API v2 response shapes
//!
//! Only the fields GreenScan reads are declared. Every field is optional so a
//! sparse record still decodes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level `GET /api/v2/product/{barcode}.json` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffResponse {
    /// 1 when found, 0 when not
    #[serde(default)]
    pub status: Option<Value>,

    #[serde(default)]
    pub status_verbose: Option<String>,

    #[serde(default)]
    pub product: Option<OffProduct>,
}

impl OffResponse {
    /// Product record, or `None` when the payload signals "not found"
    pub fn into_product(self) -> Option<OffProduct> {
        let not_found = match &self.status {
            Some(Value::Number(n)) => n.as_i64() == Some(0),
            Some(Value::String(s)) => s == "0",
            _ => false,
        };
        if not_found {
            return None;
        }
        self.product
    }
}

/// Product record as stored by Open Food Facts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OffProduct {
    #[serde(default)]
    pub product_name: Option<String>,

    /// Comma-separated brand list, used as-is
    #[serde(default)]
    pub brands: Option<String>,

    #[serde(default)]
    pub quantity: Option<String>,

    #[serde(default)]
    pub image_front_url: Option<String>,

    #[serde(default)]
    pub ingredients_text: Option<String>,

    #[serde(default)]
    pub allergens_hierarchy: Option<Vec<String>>,

    #[serde(default)]
    pub nutrient_levels: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub nutriments: Option<OffNutriments>,

    #[serde(default)]
    pub ecoscore_grade: Option<String>,
}

/// Per-100g nutriment values read from the `nutriments` object
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OffNutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    pub energy_kcal_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins_100g: Option<f64>,
}

/// Accept numbers and numeric strings; anything else reads as absent
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_zero_means_not_found() {
        let response: OffResponse = serde_json::from_value(json!({
            "status": 0,
            "status_verbose": "product not found",
            "product": { "product_name": "ghost" }
        }))
        .unwrap();
        assert!(response.into_product().is_none());
    }

    #[test]
    fn test_missing_product_means_not_found() {
        let response: OffResponse = serde_json::from_value(json!({ "status": 1 })).unwrap();
        assert!(response.into_product().is_none());
    }

    #[test]
    fn test_found_product() {
        let response: OffResponse = serde_json::from_value(json!({
            "status": 1,
            "product": { "product_name": "Nutella", "ecoscore_grade": "d" }
        }))
        .unwrap();
        let product = response.into_product().unwrap();
        assert_eq!(product.product_name.as_deref(), Some("Nutella"));
        assert_eq!(product.ecoscore_grade.as_deref(), Some("d"));
    }

    #[test]
    fn test_nutriments_accept_numeric_strings() {
        let nutriments: OffNutriments = serde_json::from_value(json!({
            "energy-kcal_100g": 539,
            "fat_100g": "30.9",
            "carbohydrates_100g": "n/a",
            "proteins_100g": null
        }))
        .unwrap();
        assert_eq!(nutriments.energy_kcal_100g, Some(539.0));
        assert_eq!(nutriments.fat_100g, Some(30.9));
        assert_eq!(nutriments.carbohydrates_100g, None);
        assert_eq!(nutriments.proteins_100g, None);
    }
}
