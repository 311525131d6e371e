//! Per-category rule policies.
//!
//! A [`RulePolicyMap`] is supplied by the settings store and only read by the
//! guard. Updates build new maps; nothing mutates a map that is shared.

use crate::categories::{Category, MaskMode, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detection, masking, and severity configuration for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePolicy {
    pub enabled: bool,
    pub mask_mode: MaskMode,
    pub risk_level: RiskLevel,
}

impl RulePolicy {
    pub const fn new(enabled: bool, mask_mode: MaskMode, risk_level: RiskLevel) -> Self {
        Self {
            enabled,
            mask_mode,
            risk_level,
        }
    }

    /// Seeded default for a category.
    pub const fn default_for(category: Category) -> Self {
        match category {
            Category::Name => Self::new(true, MaskMode::Warn, RiskLevel::Low),
            Category::Phone => Self::new(true, MaskMode::Partial, RiskLevel::Medium),
            Category::BankCard => Self::new(true, MaskMode::Full, RiskLevel::High),
            Category::Email => Self::new(true, MaskMode::Partial, RiskLevel::Medium),
            Category::ApiKey => Self::new(true, MaskMode::Full, RiskLevel::High),
            Category::Custom => Self::new(true, MaskMode::Full, RiskLevel::Medium),
        }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn with_mask_mode(self, mask_mode: MaskMode) -> Self {
        Self { mask_mode, ..self }
    }

    pub fn with_risk_level(self, risk_level: RiskLevel) -> Self {
        Self { risk_level, ..self }
    }
}

/// Policy per category.
///
/// `Default` seeds every category. Maps built with [`RulePolicyMap::from_entries`]
/// or deserialized directly may be partial; consumers must handle `None` from
/// [`RulePolicyMap::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulePolicyMap(BTreeMap<Category, RulePolicy>);

impl RulePolicyMap {
    /// Build a map holding exactly the given entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Category, RulePolicy)>,
    {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, category: Category) -> Option<&RulePolicy> {
        self.0.get(&category)
    }

    /// Whether the category is present and enabled.
    pub fn is_enabled(&self, category: Category) -> bool {
        self.get(category).map(|p| p.enabled).unwrap_or(false)
    }

    /// New map with one entry replaced.
    pub fn with_policy(&self, category: Category, policy: RulePolicy) -> Self {
        let mut entries = self.0.clone();
        entries.insert(category, policy);
        Self(entries)
    }

    /// Categories that have no entry.
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.0.contains_key(c))
            .collect()
    }

    pub fn is_total(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &RulePolicy)> {
        self.0.iter().map(|(c, p)| (*c, p))
    }
}

impl Default for RulePolicyMap {
    fn default() -> Self {
        Self::from_entries(
            Category::ALL
                .into_iter()
                .map(|c| (c, RulePolicy::default_for(c))),
        )
    }
}
