//! Product lookup endpoint
//!
//! POST /api/product-info with `{"barcode": "..."}`:
//! - 200: `ProductInfo`
//! - 400: `{"error": "Barcode is required"}`
//! - 404: `{"error": "Product not found"}` or `{"error": "Product not found in database"}`
//! - 500: `{"error": "Internal Server Error", "details": "..."}`

use crate::normalize::normalize_product;
use crate::{ApiResult, AppState, LookupError};
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use gscan_common::api::types::{ErrorResponse, INTERNAL_SERVER_ERROR};
use gscan_common::api::PRODUCT_INFO_PATH;
use gscan_common::ProductInfo;
use serde_json::Value;
use std::any::Any;
use tracing::{error, info, warn};

/// POST /api/product-info handler
///
/// **Behavior:**
/// 1. Validate barcode (present, string, non-blank); no upstream call otherwise
/// 2. Fetch the raw record from the product database
/// 3. Normalize and derive the eco-score rating
///
/// The body is read as raw bytes so that a malformed body answers with the
/// same 400 shape as a missing barcode.
pub async fn product_info(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ProductInfo>> {
    let barcode = extract_barcode(&body).map_err(|e| {
        warn!(kind = %e.kind(), "Rejected lookup request: {}", e);
        e
    })?;

    let product = state
        .source
        .fetch_product(&barcode)
        .await
        .map_err(|e| {
            match e.kind() {
                crate::ErrorKind::NotFound => {
                    info!(barcode = %barcode, source = state.source.name(), "Product not found: {}", e)
                }
                kind => {
                    error!(barcode = %barcode, source = state.source.name(), kind = %kind, "Lookup failed: {}", e)
                }
            }
            e
        })?;

    let info = normalize_product(&barcode, product);

    info!(
        barcode = %barcode,
        product = %info.product_name,
        grade = %info.eco_score.grade(),
        "Resolved product"
    );

    Ok(Json(info))
}

/// Barcode from a `{"barcode": "..."}` body, trimmed
pub fn extract_barcode(body: &[u8]) -> Result<String, LookupError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| LookupError::InvalidRequest(format!("body is not valid JSON: {}", e)))?;

    match value.get("barcode") {
        Some(Value::String(code)) if !code.trim().is_empty() => Ok(code.trim().to_string()),
        Some(Value::String(_)) => Err(LookupError::InvalidRequest("barcode is empty".to_string())),
        Some(Value::Null) | None => {
            Err(LookupError::InvalidRequest("barcode is missing".to_string()))
        }
        Some(_) => Err(LookupError::InvalidRequest(
            "barcode must be a string".to_string(),
        )),
    }
}

/// Panic inside a handler → generic 500 body
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    error!("Handler panicked: {}", details);

    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_details(INTERNAL_SERVER_ERROR, details)),
    )
        .into_response()
}

/// Build product lookup routes
pub fn product_routes() -> Router<AppState> {
    Router::new().route(PRODUCT_INFO_PATH, post(product_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_barcode() {
        assert_eq!(
            extract_barcode(br#"{"barcode":"3017620422003"}"#).unwrap(),
            "3017620422003"
        );
        assert_eq!(extract_barcode(br#"{"barcode":" 42\n"}"#).unwrap(), "42");
    }

    #[test]
    fn test_extract_barcode_rejects_bad_input() {
        for body in [
            &br#"{}"#[..],
            br#"{"barcode":""}"#,
            br#"{"barcode":"   "}"#,
            br#"{"barcode":null}"#,
            br#"{"barcode":3017620422003}"#,
            br#"["3017620422003"]"#,
            b"barcode=42",
            b"",
        ] {
            let err = extract_barcode(body).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidRequest, "body {:?}", body);
        }
    }
}
