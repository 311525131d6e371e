//! Sensitive-data categories and the severity scales attached to them.
//!
//! The category set is closed: every per-category behavior in the workspace
//! (detection, placeholders, partial masks, risk floors) is a `match` over
//! [`Category`], so adding a variant forces every dispatch site to be updated.

use serde::{Deserialize, Serialize};

/// Kind of sensitive data a hit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Personal name captured after a cue phrase.
    Name,
    /// Mobile phone number.
    Phone,
    /// Payment card number (Luhn-validated).
    BankCard,
    /// Email address.
    Email,
    /// Provider API key or access token.
    ApiKey,
    /// Policy-defined category, never produced by the built-in detector.
    Custom,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Name,
        Category::Phone,
        Category::BankCard,
        Category::Email,
        Category::ApiKey,
        Category::Custom,
    ];

    /// Categories the built-in detector can produce.
    pub const BUILTIN: [Category; 5] = [
        Category::Name,
        Category::Phone,
        Category::BankCard,
        Category::Email,
        Category::ApiKey,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Name => "name",
            Category::Phone => "phone",
            Category::BankCard => "bank_card",
            Category::Email => "email",
            Category::ApiKey => "api_key",
            Category::Custom => "custom",
        }
    }

    /// Parse a category from its wire name.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Category::Name),
            "phone" => Some(Category::Phone),
            "bank_card" | "bank-card" | "card" => Some(Category::BankCard),
            "email" => Some(Category::Email),
            "api_key" | "api-key" | "apikey" => Some(Category::ApiKey),
            "custom" => Some(Category::Custom),
            _ => None,
        }
    }

    /// Whether the built-in detector produces this category.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Category::Custom)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse_str(s).ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Where a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Builtin,
    Custom,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Builtin => write!(f, "builtin"),
            Source::Custom => write!(f, "custom"),
        }
    }
}

/// Ordered severity: `Low < Medium < High`.
///
/// Variant order is the ordering; aggregation uses `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" | "med" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!("unknown risk level: {}", s)),
        }
    }
}

/// How a matched span is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Replace with the category placeholder.
    Full,
    /// Category-specific partial reveal.
    Partial,
    /// Leave the text unchanged; only flag the hit.
    Warn,
}

impl std::fmt::Display for MaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskMode::Full => write!(f, "full"),
            MaskMode::Partial => write!(f, "partial"),
            MaskMode::Warn => write!(f, "warn"),
        }
    }
}

impl std::str::FromStr for MaskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(MaskMode::Full),
            "partial" => Ok(MaskMode::Partial),
            "warn" => Ok(MaskMode::Warn),
            _ => Err(format!("unknown mask mode: {}", s)),
        }
    }
}

/// The guard's verdict for a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Confirm,
    Block,
}

impl Action {
    /// Whether the send may proceed without asking the user.
    pub fn is_allow(&self) -> bool {
        matches!(self, Action::Allow)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Allow => write!(f, "allow"),
            Action::Confirm => write!(f, "confirm"),
            Action::Block => write!(f, "block"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::Low.max(RiskLevel::High), RiskLevel::High);
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(Category::parse_str(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse_str("unknown"), None);
    }

    #[test]
    fn test_builtin_excludes_custom() {
        assert!(!Category::BUILTIN.contains(&Category::Custom));
        assert!(Category::BUILTIN.iter().all(|c| c.is_builtin()));
        assert!(!Category::Custom.is_builtin());
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&Category::BankCard).unwrap(),
            "\"bank_card\""
        );
        assert_eq!(serde_json::to_string(&MaskMode::Warn).unwrap(), "\"warn\"");
        let level: RiskLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_parse_levels_and_modes() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!("partial".parse::<MaskMode>().unwrap(), MaskMode::Partial);
        assert!("loud".parse::<MaskMode>().is_err());
    }
}
