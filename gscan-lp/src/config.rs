//! Configuration for gscan-lp
//!
//! Bootstrap settings only: listen address, product database endpoint and
//! logging. Resolution order per setting is CLI → environment → TOML →
//! built-in default (see `gscan_common::config`).

use gscan_common::config::{resolve_setting, validate_timeout_secs, LoggingConfig};
use gscan_common::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Module name, also the config file stem (`gscan-lp.toml`)
pub const MODULE_NAME: &str = "gscan-lp";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
pub const DEFAULT_UPSTREAM_URL: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

pub const ENV_BIND_ADDR: &str = "GSCAN_LP_BIND";
pub const ENV_UPSTREAM_URL: &str = "GSCAN_UPSTREAM_URL";
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "GSCAN_UPSTREAM_TIMEOUT_SECS";

fn default_user_agent() -> String {
    format!(
        "GreenScan/{} (https://github.com/greenscan/greenscan)",
        env!("CARGO_PKG_VERSION")
    )
}

/// `gscan-lp.toml` contents
///
/// ```toml
/// bind_addr = "0.0.0.0:5780"
///
/// [upstream]
/// base_url = "https://world.openfoodfacts.org"
/// timeout_secs = 10
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyTomlConfig {
    #[serde(default)]
    pub bind_addr: Option<SocketAddr>,

    #[serde(default)]
    pub upstream: UpstreamTomlConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamTomlConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_addr: Option<SocketAddr>,
    pub upstream_url: Option<Url>,
    pub upstream_timeout_secs: Option<u64>,
}

/// Product database endpoint settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

/// Resolved gscan-lp configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

impl ProxyConfig {
    pub fn resolve(cli: CliOverrides, toml: ProxyTomlConfig) -> Result<Self> {
        let default_bind: SocketAddr = DEFAULT_BIND_ADDR
            .parse()
            .map_err(|e| Error::Config(format!("Invalid default bind address: {}", e)))?;
        let bind_addr = resolve_setting(cli.bind_addr, ENV_BIND_ADDR, toml.bind_addr, default_bind)?;

        let toml_url = toml
            .upstream
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| Error::Config(format!("Invalid upstream.base_url: {}", e)))?;
        let defaults = UpstreamConfig::default();
        let base_url = resolve_setting(
            cli.upstream_url,
            ENV_UPSTREAM_URL,
            toml_url,
            defaults.base_url,
        )?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Upstream URL must be an http(s) base URL: {}",
                base_url
            )));
        }

        let timeout_secs = resolve_setting(
            cli.upstream_timeout_secs,
            ENV_UPSTREAM_TIMEOUT_SECS,
            toml.upstream.timeout_secs,
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;
        let timeout_secs = validate_timeout_secs("upstream.timeout_secs", timeout_secs)?;

        let user_agent = toml
            .upstream
            .user_agent
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        Ok(Self {
            bind_addr,
            upstream: UpstreamConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                user_agent,
            },
            logging: toml.logging,
        })
    }
}
