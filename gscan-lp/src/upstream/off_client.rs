//! Open Food Facts API client
//!
//! One `GET /api/v2/product/{barcode}.json` per lookup. No retries and no
//! caching; the request timeout comes from [`UpstreamConfig`].

use super::types::{OffProduct, OffResponse};
use super::ProductSource;
use crate::config::UpstreamConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use gscan_common::api::types::{PRODUCT_NOT_FOUND, PRODUCT_NOT_IN_DATABASE};
use reqwest::{StatusCode, Url};

/// Open Food Facts API client
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl OpenFoodFactsClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Product URL with the barcode escaped as a single path segment
    pub fn product_url(&self, barcode: &str) -> Result<Url, LookupError> {
        let file_name = format!("{}.json", barcode);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LookupError::Internal(format!("Unusable upstream base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v2", "product", file_name.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl ProductSource for OpenFoodFactsClient {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    async fn fetch_product(&self, barcode: &str) -> Result<OffProduct, LookupError> {
        let url = self.product_url(barcode)?;

        tracing::debug!(barcode = %barcode, url = %url, "Querying Open Food Facts");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::upstream_transport(&e))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(PRODUCT_NOT_FOUND.to_string()));
        }

        if !status.is_success() {
            return Err(LookupError::upstream_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::upstream_transport(&e))?;

        let payload: OffResponse = serde_json::from_slice(&body)
            .map_err(|e| LookupError::Internal(format!("Malformed upstream payload: {}", e)))?;

        let verbose = payload.status_verbose.clone();
        let product = payload.into_product().ok_or_else(|| {
            tracing::debug!(
                barcode = %barcode,
                status_verbose = verbose.as_deref().unwrap_or(""),
                "Open Food Facts has no product"
            );
            LookupError::NotFound(PRODUCT_NOT_IN_DATABASE.to_string())
        })?;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base: &str) -> OpenFoodFactsClient {
        let config = UpstreamConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
            user_agent: "GreenScan-test".to_string(),
        };
        OpenFoodFactsClient::new(&config).unwrap()
    }

    #[test]
    fn test_product_url() {
        let url = client("https://world.openfoodfacts.org")
            .product_url("3017620422003")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://world.openfoodfacts.org/api/v2/product/3017620422003.json"
        );
    }

    #[test]
    fn test_product_url_keeps_base_path() {
        let url = client("http://localhost:8080/off/")
            .product_url("42")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/off/api/v2/product/42.json");
    }

    #[test]
    fn test_product_url_escapes_barcode() {
        let url = client("https://world.openfoodfacts.org")
            .product_url("../admin?x=1")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://world.openfoodfacts.org/api/v2/product/..%2Fadmin%3Fx=1.json"
        );
    }
}
