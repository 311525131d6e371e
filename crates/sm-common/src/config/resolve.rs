//! Configuration resolution for SentinelMask.
//!
//! Implements deterministic resolution order:
//! 1. Explicit CLI flags (--config, --data)
//! 2. Environment variables (SENTINEL_MASK_CONFIG, SENTINEL_MASK_DATA)
//! 3. XDG environment (XDG_CONFIG_HOME, XDG_DATA_HOME)
//! 4. Platform defaults (~/.config/sentinel_mask, ~/.local/share/sentinel_mask)
//! 5. Built-in defaults (settings only)

use std::env;
use std::path::PathBuf;

use super::{ConfigResolution, ConfigSource, GuardSettings};
use crate::error::{Error, Result};

const APP_DIR: &str = "sentinel_mask";
pub const SETTINGS_FILE: &str = "settings.json";
pub const LOG_FILE: &str = "guard_logs.json";

/// Directory overrides from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory containing settings.json
    pub config_dir: Option<PathBuf>,
    /// Directory containing guard_logs.json
    pub data_dir: Option<PathBuf>,
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug)]
pub struct ConfigResolver {
    cli_paths: ConfigPaths,
}

impl ConfigResolver {
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { cli_paths: paths }
    }

    /// Create a resolver with no CLI overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver {
            cli_paths: ConfigPaths::default(),
        }
    }

    /// Resolve the config directory and how it was found.
    pub fn resolve_config_dir(&self) -> Option<(PathBuf, ConfigResolution)> {
        if let Some(ref dir) = self.cli_paths.config_dir {
            return Some((dir.clone(), ConfigResolution::CliFlag));
        }
        if let Ok(dir) = env::var("SENTINEL_MASK_CONFIG") {
            return Some((PathBuf::from(dir), ConfigResolution::EnvVar));
        }
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return Some((PathBuf::from(xdg).join(APP_DIR), ConfigResolution::XdgConfig));
        }
        dirs::config_dir().map(|d| (d.join(APP_DIR), ConfigResolution::XdgConfig))
    }

    /// Resolve the data directory holding the guard log.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.cli_paths.data_dir {
            return Some(dir.clone());
        }
        if let Ok(dir) = env::var("SENTINEL_MASK_DATA") {
            return Some(PathBuf::from(dir));
        }
        if let Ok(xdg) = env::var("XDG_DATA_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR));
        }
        dirs::data_dir().map(|d| d.join(APP_DIR))
    }

    /// Path settings are read from and written to.
    pub fn settings_path(&self) -> Result<PathBuf> {
        self.resolve_config_dir()
            .map(|(dir, _)| dir.join(SETTINGS_FILE))
            .ok_or(Error::NoConfigDir)
    }

    /// Path of the persisted guard log.
    pub fn log_path(&self) -> Result<PathBuf> {
        self.resolve_data_dir()
            .map(|dir| dir.join(LOG_FILE))
            .ok_or(Error::NoConfigDir)
    }

    /// Load settings, using built-in defaults when no file exists.
    pub fn load_settings(&self) -> Result<(GuardSettings, ConfigSource)> {
        if let Some((dir, resolution)) = self.resolve_config_dir() {
            let path = dir.join(SETTINGS_FILE);
            if path.exists() {
                let settings = GuardSettings::load(&path)?;
                let source = ConfigSource {
                    path: Some(path.display().to_string()),
                    fingerprint: Some(settings.fingerprint()?),
                    resolution,
                };
                return Ok((settings, source));
            }
        }

        let settings = GuardSettings::default();
        let source = ConfigSource {
            path: None,
            fingerprint: Some(settings.fingerprint()?),
            resolution: ConfigResolution::Default,
        };
        Ok((settings, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsPatch;

    #[test]
    fn test_cli_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            data_dir: Some(dir.path().join("data")),
        });

        let (resolved, resolution) = resolver.resolve_config_dir().unwrap();
        assert_eq!(resolved, dir.path());
        assert_eq!(resolution, ConfigResolution::CliFlag);
        assert_eq!(
            resolver.log_path().unwrap(),
            dir.path().join("data").join(LOG_FILE)
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            data_dir: None,
        });

        let (settings, source) = resolver.load_settings().unwrap();
        assert_eq!(settings, GuardSettings::default());
        assert_eq!(source.resolution, ConfigResolution::Default);
        assert!(source.path.is_none());
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            data_dir: None,
        });
        let saved = GuardSettings::default().apply(&SettingsPatch::enabled(false));
        saved.save(resolver.settings_path().unwrap()).unwrap();

        let (settings, source) = resolver.load_settings().unwrap();
        assert!(!settings.enabled);
        assert_eq!(source.resolution, ConfigResolution::CliFlag);
        assert!(source.path.unwrap().ends_with(SETTINGS_FILE));
    }
}
