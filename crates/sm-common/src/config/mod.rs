//! Settings loading and validation for SentinelMask.
//!
//! This module provides:
//! - Typed guard settings with per-category rule policies
//! - Partial settings patches merged immutably over defaults
//! - Deterministic path resolution (CLI > env > XDG > defaults)

pub mod resolve;
pub mod settings;

pub use resolve::{ConfigPaths, ConfigResolver, LOG_FILE, SETTINGS_FILE};
pub use settings::{
    GuardSettings, PolicyPatch, SettingsPatch, DEFAULT_ALLOW_SITES, DEFAULT_LOG_RETENTION_DAYS,
    DEFAULT_MAX_LOG_BYTES, DEFAULT_MAX_LOG_ENTRIES,
};

use serde::Serialize;

/// Where the active settings came from.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSource {
    /// Path to the settings file, or None if using defaults
    pub path: Option<String>,
    /// Short SHA-256 of the effective settings
    pub fingerprint: Option<String>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

/// How a settings file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigResolution {
    /// From explicit CLI flag
    CliFlag,
    /// From environment variable
    EnvVar,
    /// From XDG config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::CliFlag => write!(f, "cli"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}
