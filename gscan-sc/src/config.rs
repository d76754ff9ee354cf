//! Configuration for gscan-sc
//!
//! Resolution order per setting is CLI → environment → TOML → built-in
//! default (see `gscan_common::config`).

use crate::devices::CameraDevice;
use gscan_common::config::{resolve_setting, validate_timeout_secs, LoggingConfig};
use gscan_common::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Module name, also the config file stem (`gscan-sc.toml`)
pub const MODULE_NAME: &str = "gscan-sc";

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:5780";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;

pub const ENV_PROXY_URL: &str = "GSCAN_PROXY_URL";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "GSCAN_LOOKUP_TIMEOUT_SECS";
pub const ENV_DEVICE_ID: &str = "GSCAN_DEVICE_ID";

/// `gscan-sc.toml` contents
///
/// ```toml
/// proxy_url = "http://127.0.0.1:5780"
/// lookup_timeout_secs = 15
/// device_id = "usb-cam-1"
///
/// [[cameras]]
/// device_id = "usb-cam-1"
/// label = "USB Camera"
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanTomlConfig {
    #[serde(default)]
    pub proxy_url: Option<String>,

    #[serde(default)]
    pub lookup_timeout_secs: Option<u64>,

    #[serde(default)]
    pub device_id: Option<String>,

    /// Devices offered by the camera picker
    #[serde(default)]
    pub cameras: Vec<CameraDevice>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub proxy_url: Option<Url>,
    pub lookup_timeout_secs: Option<u64>,
    pub device_id: Option<String>,
}

/// Resolved gscan-sc configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub proxy_url: Url,
    pub lookup_timeout: Duration,
    /// `None` requests the environment-facing camera
    pub device_id: Option<String>,
    pub cameras: Vec<CameraDevice>,
    pub logging: LoggingConfig,
}

impl ControllerConfig {
    pub fn resolve(cli: CliOverrides, toml: ScanTomlConfig) -> Result<Self> {
        let toml_url = toml
            .proxy_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::Config(format!("Invalid proxy_url: {}", e)))?;
        let default_url = Url::parse(DEFAULT_PROXY_URL)
            .map_err(|e| Error::Config(format!("Invalid default proxy URL: {}", e)))?;
        let proxy_url = resolve_setting(cli.proxy_url, ENV_PROXY_URL, toml_url, default_url)?;
        if proxy_url.cannot_be_a_base() || !matches!(proxy_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Proxy URL must be an http(s) base URL: {}",
                proxy_url
            )));
        }

        let timeout_secs = resolve_setting(
            cli.lookup_timeout_secs,
            ENV_LOOKUP_TIMEOUT_SECS,
            toml.lookup_timeout_secs,
            DEFAULT_LOOKUP_TIMEOUT_SECS,
        )?;
        let timeout_secs = validate_timeout_secs("lookup_timeout_secs", timeout_secs)?;

        // No compiled default: absent everywhere means "default camera"
        let device_id = cli
            .device_id
            .or_else(|| std::env::var(ENV_DEVICE_ID).ok())
            .or(toml.device_id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(Self {
            proxy_url,
            lookup_timeout: Duration::from_secs(timeout_secs),
            device_id,
            cameras: toml.cameras,
            logging: toml.logging,
        })
    }
}
