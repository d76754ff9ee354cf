//! Configuration loading and setting resolution
//!
//! Settings follow one priority order across GreenScan binaries:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "greenscan";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Candidate config file locations for a module, most specific first
///
/// - `<config dir>/greenscan/<module>.toml` (e.g. `~/.config/greenscan/gscan-lp.toml`)
/// - `/etc/greenscan/<module>.toml` on Linux
pub fn config_file_candidates(module_name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join(&file_name));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(&file_name));
    }

    candidates
}

/// Load a module's TOML config
///
/// An explicit path must exist. Without one, the first existing file from
/// [`config_file_candidates`] is used, and `T::default()` when none exists.
pub fn load_toml_config<T>(explicit: Option<&Path>, module_name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match config_file_candidates(module_name)
            .into_iter()
            .find(|p| p.exists())
        {
            Some(path) => path,
            None => {
                debug!(module = module_name, "No config file found, using defaults");
                return Ok(T::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e))
    })?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve one setting by priority: CLI → environment → TOML → default
///
/// Environment values are parsed with `FromStr`; an unparsable value is a
/// configuration error rather than a silent fallthrough.
pub fn resolve_setting<T>(
    cli_value: Option<T>,
    env_var_name: &str,
    toml_value: Option<T>,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    // Priority 1: Command-line argument
    if let Some(value) = cli_value {
        return Ok(value);
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        if !raw.trim().is_empty() {
            return raw.trim().parse::<T>().map_err(|e| {
                Error::Config(format!("Invalid value for {}: {}", env_var_name, e))
            });
        }
    }

    // Priority 3: TOML config file
    if let Some(value) = toml_value {
        return Ok(value);
    }

    // Priority 4: compiled default
    Ok(default)
}

/// Reject a zero-second timeout
pub fn validate_timeout_secs(name: &str, secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(Error::Config(format!("{} must be greater than zero", name)));
    }
    Ok(secs)
}
