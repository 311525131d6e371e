//! Guard settings: the master switch, rule policies, site allow list, and
//! log retention limits.
//!
//! Settings files are read as a [`SettingsPatch`] and normalized over the
//! defaults, so a partial or older file always yields fully populated
//! settings with a policy entry for every category.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::categories::{Category, MaskMode, RiskLevel};
use crate::error::{Error, Result};
use crate::policy::{RulePolicy, RulePolicyMap};

/// Chat sites the guard is active on by default.
pub const DEFAULT_ALLOW_SITES: &[&str] = &[
    "chatgpt.com",
    "chat.openai.com",
    "claude.ai",
    "gemini.google.com",
    "chat.deepseek.com",
];

pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 5000;
pub const DEFAULT_MAX_LOG_BYTES: usize = 5 * 1024 * 1024;

/// Fully populated guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSettings {
    /// Master switch. When off, callers pass text through without invoking the guard.
    pub enabled: bool,
    pub rule_policies: RulePolicyMap,
    pub allow_sites: Vec<String>,
    pub log_retention_days: u32,
    pub max_log_entries: usize,
    pub max_log_bytes: usize,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rule_policies: RulePolicyMap::default(),
            allow_sites: DEFAULT_ALLOW_SITES.iter().map(|s| s.to_string()).collect(),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }
}

/// Field-level update to one category's policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_mode: Option<MaskMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl PolicyPatch {
    pub fn apply_to(&self, base: RulePolicy) -> RulePolicy {
        RulePolicy {
            enabled: self.enabled.unwrap_or(base.enabled),
            mask_mode: self.mask_mode.unwrap_or(base.mask_mode),
            risk_level: self.risk_level.unwrap_or(base.risk_level),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.mask_mode.is_none() && self.risk_level.is_none()
    }
}

/// Partial settings, as stored on disk or sent by an options surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rule_policies: BTreeMap<Category, PolicyPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sites: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_log_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_log_bytes: Option<usize>,
}

impl SettingsPatch {
    /// Patch touching a single category's policy.
    pub fn policy(category: Category, patch: PolicyPatch) -> Self {
        let mut rule_policies = BTreeMap::new();
        rule_policies.insert(category, patch);
        Self {
            rule_policies,
            ..Self::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }
}

impl GuardSettings {
    /// Defaults overlaid with a patch.
    pub fn normalize(patch: &SettingsPatch) -> Self {
        Self::default().apply(patch)
    }

    /// New settings with the patch merged over `self`.
    ///
    /// Policies merge field by field; categories missing from `self` are
    /// seeded from their defaults first.
    pub fn apply(&self, patch: &SettingsPatch) -> Self {
        let mut policies = RulePolicyMap::default();
        for category in Category::ALL {
            let base = self
                .rule_policies
                .get(category)
                .copied()
                .unwrap_or_else(|| RulePolicy::default_for(category));
            let merged = match patch.rule_policies.get(&category) {
                Some(p) => p.apply_to(base),
                None => base,
            };
            policies = policies.with_policy(category, merged);
        }

        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            rule_policies: policies,
            allow_sites: patch
                .allow_sites
                .clone()
                .unwrap_or_else(|| self.allow_sites.clone()),
            log_retention_days: patch.log_retention_days.unwrap_or(self.log_retention_days),
            max_log_entries: patch.max_log_entries.unwrap_or(self.max_log_entries),
            max_log_bytes: patch.max_log_bytes.unwrap_or(self.max_log_bytes),
        }
    }

    /// Semantic validation.
    pub fn validate(&self) -> Result<()> {
        if self.log_retention_days == 0 {
            return Err(Error::InvalidConfig(
                "log_retention_days must be at least 1".to_string(),
            ));
        }
        if self.max_log_entries == 0 {
            return Err(Error::InvalidConfig(
                "max_log_entries must be at least 1".to_string(),
            ));
        }
        if self.max_log_bytes == 0 {
            return Err(Error::InvalidConfig(
                "max_log_bytes must be at least 1".to_string(),
            ));
        }
        for site in &self.allow_sites {
            let site = site.trim();
            if site.is_empty() || site.contains("://") || site.contains('/') {
                return Err(Error::InvalidConfig(format!(
                    "allow_sites entry must be a bare host name: {:?}",
                    site
                )));
            }
        }
        if !self.rule_policies.is_total() {
            return Err(Error::InvalidConfig(format!(
                "rule_policies missing categories: {:?}",
                self.rule_policies.missing()
            )));
        }
        Ok(())
    }

    /// Whether the guard should run for `host` (exact match or subdomain).
    pub fn is_site_allowed(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return false;
        }
        self.allow_sites.iter().any(|site| {
            let site = site.trim().to_lowercase();
            host == site || host.ends_with(&format!(".{}", site))
        })
    }

    /// Short SHA-256 fingerprint of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&canonical);
        Ok(hex::encode(digest)[..16].to_string())
    }

    /// Load settings from a file, normalizing partial content.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let patch: SettingsPatch = serde_json::from_str(&content)?;
        let settings = Self::normalize(&patch);
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GuardSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.log_retention_days, 30);
        assert_eq!(settings.max_log_entries, 5000);
        assert_eq!(settings.max_log_bytes, 5 * 1024 * 1024);
        assert!(settings.rule_policies.is_total());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_normalize_partial_policy_patch() {
        let json = r#"{"rule_policies": {"phone": {"enabled": false}}}"#;
        let patch: SettingsPatch = serde_json::from_str(json).unwrap();
        let settings = GuardSettings::normalize(&patch);

        let phone = settings.rule_policies.get(Category::Phone).unwrap();
        assert!(!phone.enabled);
        assert_eq!(phone.mask_mode, MaskMode::Partial);
        assert_eq!(phone.risk_level, RiskLevel::Medium);
        assert!(settings.rule_policies.is_total());
    }

    #[test]
    fn test_apply_does_not_touch_base() {
        let base = GuardSettings::default();
        let patch = SettingsPatch::policy(
            Category::Name,
            PolicyPatch {
                mask_mode: Some(MaskMode::Full),
                ..PolicyPatch::default()
            },
        );
        let next = base.apply(&patch);

        assert_eq!(
            base.rule_policies.get(Category::Name).unwrap().mask_mode,
            MaskMode::Warn
        );
        assert_eq!(
            next.rule_policies.get(Category::Name).unwrap().mask_mode,
            MaskMode::Full
        );
    }

    #[test]
    fn test_apply_reseeds_missing_categories() {
        let mut base = GuardSettings::default();
        base.rule_policies = RulePolicyMap::from_entries([(
            Category::Email,
            RulePolicy::default_for(Category::Email).with_enabled(false),
        )]);
        let next = base.apply(&SettingsPatch::default());

        assert!(next.rule_policies.is_total());
        assert!(!next.rule_policies.is_enabled(Category::Email));
        assert!(next.rule_policies.is_enabled(Category::ApiKey));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let settings = GuardSettings::normalize(&SettingsPatch {
            max_log_entries: Some(0),
            ..SettingsPatch::default()
        });
        assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_url_sites() {
        let settings = GuardSettings::normalize(&SettingsPatch {
            allow_sites: Some(vec!["https://chatgpt.com".to_string()]),
            ..SettingsPatch::default()
        });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_site_allow_list() {
        let settings = GuardSettings::default();
        assert!(settings.is_site_allowed("claude.ai"));
        assert!(settings.is_site_allowed("CHATGPT.COM"));
        assert!(settings.is_site_allowed("eu.claude.ai"));
        assert!(!settings.is_site_allowed("notclaude.ai"));
        assert!(!settings.is_site_allowed("example.com"));
        assert!(!settings.is_site_allowed(""));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = GuardSettings::default();
        let b = a.apply(&SettingsPatch::enabled(false));
        assert_eq!(a.fingerprint().unwrap(), a.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 16);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = GuardSettings::default().apply(&SettingsPatch::enabled(false));

        settings.save(&path).unwrap();
        let loaded = GuardSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_save_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let settings = GuardSettings::default().apply(&SettingsPatch::enabled(false));
        settings.save(&path).unwrap();

        assert_eq!(GuardSettings::load(&path).unwrap(), settings);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("settings.json")]);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = GuardSettings::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, GuardSettings::default());
    }

    #[test]
    fn test_load_rejects_bad_enum_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"rule_policies": {"email": {"mask_mode": "shout"}}}"#).unwrap();
        assert!(matches!(GuardSettings::load(&path), Err(Error::Json(_))));
    }
}
