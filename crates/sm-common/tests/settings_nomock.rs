//! No-mock settings resolution tests against real files and env vars.

use sm_common::config::{ConfigResolution, LOG_FILE, SETTINGS_FILE};
use sm_common::{Category, ConfigPaths, ConfigResolver, GuardSettings, MaskMode, RiskLevel};
use std::env;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    key: String,
    value: Option<String>,
}

impl EnvGuard {
    fn set(key: &str, value: &str) -> Self {
        let saved = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            value: saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.value {
            Some(v) => env::set_var(&self.key, v),
            None => env::remove_var(&self.key),
        }
    }
}

#[test]
fn env_var_locates_settings_and_data() {
    let _lock = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let config = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let _c = EnvGuard::set("SENTINEL_MASK_CONFIG", config.path().to_str().unwrap());
    let _d = EnvGuard::set("SENTINEL_MASK_DATA", data.path().to_str().unwrap());

    let resolver = ConfigResolver::with_defaults();
    let (dir, resolution) = resolver.resolve_config_dir().unwrap();
    assert_eq!(dir, config.path());
    assert_eq!(resolution, ConfigResolution::EnvVar);
    assert_eq!(resolver.settings_path().unwrap(), config.path().join(SETTINGS_FILE));
    assert_eq!(resolver.log_path().unwrap(), data.path().join(LOG_FILE));
}

#[test]
fn cli_flag_beats_env_var() {
    let _lock = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let env_dir = tempfile::tempdir().unwrap();
    let cli_dir = tempfile::tempdir().unwrap();
    let _c = EnvGuard::set("SENTINEL_MASK_CONFIG", env_dir.path().to_str().unwrap());

    let resolver = ConfigResolver::new(ConfigPaths {
        config_dir: Some(cli_dir.path().to_path_buf()),
        data_dir: None,
    });
    let (dir, resolution) = resolver.resolve_config_dir().unwrap();
    assert_eq!(dir, cli_dir.path());
    assert_eq!(resolution, ConfigResolution::CliFlag);
}

#[test]
fn partial_settings_file_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(SETTINGS_FILE),
        r#"{
            "allow_sites": ["chat.example.org"],
            "rule_policies": {
                "name": {"mask_mode": "full", "risk_level": "high"}
            }
        }"#,
    )
    .unwrap();

    let resolver = ConfigResolver::new(ConfigPaths {
        config_dir: Some(dir.path().to_path_buf()),
        data_dir: None,
    });
    let (settings, source) = resolver.load_settings().unwrap();

    assert!(settings.enabled);
    assert!(settings.is_site_allowed("chat.example.org"));
    assert!(!settings.is_site_allowed("claude.ai"));
    let name = settings.rule_policies.get(Category::Name).unwrap();
    assert_eq!(name.mask_mode, MaskMode::Full);
    assert_eq!(name.risk_level, RiskLevel::High);
    assert!(settings.rule_policies.is_total());
    assert_eq!(source.fingerprint.unwrap(), settings.fingerprint().unwrap());
}

#[test]
fn invalid_settings_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    std::fs::write(&path, r#"{"log_retention_days": 0}"#).unwrap();

    let err = GuardSettings::load(&path).unwrap_err();
    assert_eq!(err.code(), 10);
    assert!(err.format_human().contains("Fix:"));
}
