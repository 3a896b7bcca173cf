//! Engine configuration supplied by the host's configuration source.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{PluginId, TfaError};

/// Second-factor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfaSettings {
    /// Master switch. When false no user is challenged.
    #[serde(default)]
    pub enabled: bool,
    /// Identifier of the validator challenged first.
    pub default_validator: PluginId,
    /// Validators a user may be challenged with; everything but the
    /// default acts as a fallback candidate.
    #[serde(default)]
    pub allowed_validators: Vec<PluginId>,
    /// Plugins consulted for a challenge bypass (e.g. trusted device).
    #[serde(default)]
    pub login_plugins: Vec<PluginId>,
    /// Roles for which a second factor is required. Empty means everyone.
    #[serde(default)]
    pub required_roles: Vec<String>,
    /// Logins an unenrolled user may complete before enrollment becomes
    /// mandatory. Zero disables skipping outright.
    #[serde(default = "default_allowed_skips")]
    pub allowed_skips: u32,
    /// Flood window length in seconds.
    #[serde(default = "default_flood_window_seconds")]
    pub flood_window_seconds: u32,
    /// Challenge attempts permitted per flood window.
    #[serde(default = "default_flood_threshold")]
    pub flood_threshold: u32,
    /// When true, users holding the `admin` role are never challenged.
    #[serde(default)]
    pub admin_bypass: bool,
}

fn default_allowed_skips() -> u32 {
    3
}

fn default_flood_window_seconds() -> u32 {
    300
}

fn default_flood_threshold() -> u32 {
    6
}

impl TfaSettings {
    /// Check internal consistency. The default validator must be part of
    /// the allowed set, and one validator must be configured at all.
    pub fn validate(&self) -> Result<(), TfaError> {
        if self.default_validator.as_str().is_empty() || self.allowed_validators.is_empty() {
            return Err(TfaError::NoValidator);
        }
        if !self.allowed_validators.contains(&self.default_validator) {
            return Err(TfaError::UnknownValidator(self.default_validator.clone()));
        }
        Ok(())
    }

    /// The configured flood gating parameters.
    pub fn flood_window(&self) -> FloodWindow {
        FloodWindow {
            window: Duration::seconds(i64::from(self.flood_window_seconds)),
            threshold: self.flood_threshold,
        }
    }
}

/// Rate-limiting parameters bounding challenge attempts per time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodWindow {
    /// Length of the sliding window.
    pub window: Duration,
    /// Attempts permitted within one window.
    pub threshold: u32,
}
