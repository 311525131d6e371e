//! The guard's output contract.

use crate::categories::{Action, Category, RiskLevel, Source};
use serde::{Deserialize, Serialize};

/// Why a result looks the way it does, beyond its hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    #[default]
    None,
    /// Pipeline bypassed because input composition was in progress.
    ImeComposing,
    /// The send trigger could not be classified.
    UnknownSendTrigger,
    /// An internal fault was converted into the safe fallback result.
    EngineRuntimeError,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::None => "NONE",
            ReasonCode::ImeComposing => "IME_COMPOSING",
            ReasonCode::UnknownSendTrigger => "UNKNOWN_SEND_TRIGGER",
            ReasonCode::EngineRuntimeError => "ENGINE_RUNTIME_ERROR",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory notes attached to a result.
///
/// Rendered through `Display` into the string form callers and logs consume.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    ImeComposing,
    UnknownTrigger,
    /// A hit's configured risk was raised to the category floor.
    RiskFloor(Category),
    /// A redaction was skipped because it overlapped one already applied.
    SkipOverlap(Category),
    GuardError(String),
    GatewayFallback(String),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ImeComposing => write!(f, "ime-composing"),
            Warning::UnknownTrigger => write!(f, "unknown-trigger"),
            Warning::RiskFloor(category) => write!(f, "risk-floor:{}", category),
            Warning::SkipOverlap(category) => write!(f, "skip-overlap:{}", category),
            Warning::GuardError(message) => write!(f, "guard-error:{}", message),
            Warning::GatewayFallback(message) => write!(f, "gateway-fallback:{}", message),
        }
    }
}

/// Position-free projection of an annotated hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitSummary {
    pub category: Category,
    pub source: Source,
    pub risk_level: RiskLevel,
}

/// Outcome of one guard invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    pub masked_text: String,
    pub risk_level: RiskLevel,
    pub action: Action,
    pub hits: Vec<HitSummary>,
    pub warnings: Vec<String>,
    pub reason_code: ReasonCode,
}

impl GuardResult {
    /// Result for a send attempted while input composition is in progress.
    pub fn composing(raw_text: &str) -> Self {
        Self {
            masked_text: raw_text.to_string(),
            risk_level: RiskLevel::Low,
            action: Action::Allow,
            hits: Vec::new(),
            warnings: vec![Warning::ImeComposing.to_string()],
            reason_code: ReasonCode::ImeComposing,
        }
    }

    /// Fixed fallback for an internal fault: original text, confirm, medium.
    pub fn engine_error(raw_text: &str, message: &str) -> Self {
        Self {
            masked_text: raw_text.to_string(),
            risk_level: RiskLevel::Medium,
            action: Action::Confirm,
            hits: Vec::new(),
            warnings: vec![Warning::GuardError(message.to_string()).to_string()],
            reason_code: ReasonCode::EngineRuntimeError,
        }
    }

    /// Whether any warning starts with the given prefix.
    pub fn has_warning(&self, prefix: &str) -> bool {
        self.warnings.iter().any(|w| w.starts_with(prefix))
    }

    /// Hit counts per category, in first-seen order, e.g. `phone:1, email:2`.
    pub fn hit_summary(&self) -> String {
        let mut counts: Vec<(Category, usize)> = Vec::new();
        for hit in &self.hits {
            match counts.iter_mut().find(|(c, _)| *c == hit.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((hit.category, 1)),
            }
        }
        counts
            .iter()
            .map(|(c, n)| format!("{}:{}", c, n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_strings() {
        assert_eq!(Warning::RiskFloor(Category::BankCard).to_string(), "risk-floor:bank_card");
        assert_eq!(Warning::SkipOverlap(Category::Phone).to_string(), "skip-overlap:phone");
        assert_eq!(Warning::UnknownTrigger.to_string(), "unknown-trigger");
        assert_eq!(
            Warning::GuardError("boom".into()).to_string(),
            "guard-error:boom"
        );
    }

    #[test]
    fn test_reason_code_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReasonCode::UnknownSendTrigger).unwrap(),
            "\"UNKNOWN_SEND_TRIGGER\""
        );
        assert_eq!(ReasonCode::default(), ReasonCode::None);
    }

    #[test]
    fn test_engine_error_fails_toward_confirm() {
        let result = GuardResult::engine_error("raw", "bad policy");
        assert_eq!(result.action, Action::Confirm);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.masked_text, "raw");
        assert_eq!(result.warnings, vec!["guard-error:bad policy".to_string()]);
        assert_eq!(result.reason_code, ReasonCode::EngineRuntimeError);
    }

    #[test]
    fn test_hit_summary_counts_in_first_seen_order() {
        let mut result = GuardResult::composing("x");
        let hit = |category| HitSummary {
            category,
            source: Source::Builtin,
            risk_level: RiskLevel::Medium,
        };
        result.hits = vec![hit(Category::Phone), hit(Category::Email), hit(Category::Phone)];
        assert_eq!(result.hit_summary(), "phone:2, email:1");
    }
}
