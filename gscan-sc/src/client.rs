//! HTTP client for the lookup proxy
//!
//! Posts `{"barcode": "..."}` to `/api/product-info` and maps the answer
//! into a `ProductInfo` or a display-ready [`LookupFailure`].

use crate::lookup::{LookupFailure, ProductLookup, GENERIC_FAILURE_MESSAGE};
use async_trait::async_trait;
use gscan_common::api::types::{ErrorResponse, LookupRequest};
use gscan_common::api::PRODUCT_INFO_PATH;
use gscan_common::ProductInfo;
use reqwest::Url;
use tracing::debug;

/// Lookup proxy client
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl ProxyClient {
    /// Client for the proxy at `base_url` (e.g. `http://127.0.0.1:5780`)
    pub fn new(base_url: &Url) -> Result<Self, LookupFailure> {
        let endpoint = base_url
            .join(PRODUCT_INFO_PATH)
            .map_err(|e| LookupFailure::Transport(format!("Invalid proxy URL: {}", e)))?;

        // Timeouts are enforced by the controller
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProductLookup for ProxyClient {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupFailure> {
        debug!(barcode = %barcode, endpoint = %self.endpoint, "Requesting product info");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&LookupRequest::new(barcode))
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            return Err(LookupFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<ProductInfo>(&body).map_err(|e| {
            LookupFailure::Transport(format!("Invalid response from lookup service: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joined_to_base() {
        let client = ProxyClient::new(&Url::parse("http://127.0.0.1:5780").unwrap()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://127.0.0.1:5780/api/product-info"
        );
    }
}
