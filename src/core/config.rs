//! Extension configuration.
//!
//! One recognized option: `telemetry.enabled` (default `true`). It gates all
//! usage logging; it never gates resource synchronization.

use crate::core::error::AlmanacError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlmanacConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Load configuration from an optional TOML file.
///
/// A missing file yields defaults; a present-but-malformed file is an error
/// so misconfiguration does not silently re-enable telemetry.
pub fn load_config(path: Option<&Path>) -> Result<AlmanacConfig, AlmanacError> {
    let Some(path) = path else {
        return Ok(AlmanacConfig::default());
    };
    if !path.exists() {
        return Ok(AlmanacConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(AlmanacError::IoError)?;
    toml::from_str(&raw).map_err(|e| {
        AlmanacError::ConfigError(format!("{}: {}", path.display(), e))
    })
}
