//! Camera selection and scanner settings
//!
//! The camera itself belongs to the scanning component; the controller only
//! decides which device to request and which symbologies to decode.

use serde::{Deserialize, Serialize};

/// Camera device as reported by the device enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub device_id: String,
    pub label: String,
}

/// Which way the requested camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Environment,
}

/// Camera constraints handed to the scanning component
///
/// A specific device id wins; without one the environment-facing camera is
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<FacingMode>,
}

impl VideoConstraints {
    /// Constraints for an optional device id; blank ids count as "default"
    pub fn for_device(device_id: Option<&str>) -> Self {
        match device_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self {
                device_id: Some(id.to_string()),
                facing_mode: None,
            },
            None => Self {
                device_id: None,
                facing_mode: Some(FacingMode::Environment),
            },
        }
    }
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self::for_device(None)
    }
}

/// Barcode symbologies the scanner decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[serde(rename = "qr_code")]
    QrCode,
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "code_128")]
    Code128,
    #[serde(rename = "upc_a")]
    UpcA,
    #[serde(rename = "itf")]
    Itf,
}

/// Common retail and QR formats
pub const SUPPORTED_FORMATS: [BarcodeFormat; 5] = [
    BarcodeFormat::QrCode,
    BarcodeFormat::Ean13,
    BarcodeFormat::Code128,
    BarcodeFormat::UpcA,
    BarcodeFormat::Itf,
];

/// Full configuration handed to the scanning component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSettings {
    pub constraints: VideoConstraints,
    pub formats: Vec<BarcodeFormat>,
    /// One code per decode batch
    pub allow_multiple: bool,
}

impl ScannerSettings {
    pub fn for_device(device_id: Option<&str>) -> Self {
        Self {
            constraints: VideoConstraints::for_device(device_id),
            formats: SUPPORTED_FORMATS.to_vec(),
            allow_multiple: false,
        }
    }
}

/// Options for a camera picker: "Default Camera" first, then each device
pub fn device_options(devices: &[CameraDevice]) -> Vec<(Option<String>, String)> {
    std::iter::once((None, "Default Camera".to_string()))
        .chain(
            devices
                .iter()
                .map(|d| (Some(d.device_id.clone()), d.label.clone())),
        )
        .collect()
}
