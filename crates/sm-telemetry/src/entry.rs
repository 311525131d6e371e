//! Guard log records.
//!
//! One record per guard invocation. Records carry categories, counts, and
//! warnings only; no raw or masked text is ever stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sm_common::{
    Action, Category, GuardResult, PreSendContext, ReasonCode, RiskLevel, SendTrigger, Source,
    Warning,
};
use uuid::Uuid;

/// Structured record of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub site: String,
    pub trigger: SendTrigger,
    /// Final action after the confirmation step, not the guard's proposal.
    pub action: Action,
    pub risk_level: RiskLevel,
    /// Hit categories in hit order, duplicates kept.
    pub hit_types: Vec<Category>,
    pub hit_count: usize,
    /// Distinct hit sources in first-seen order.
    pub sources: Vec<Source>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ReasonCode>,
}

impl GuardLogEntry {
    /// Record a completed guard run.
    pub fn from_result(
        context: &PreSendContext,
        final_action: Action,
        result: &GuardResult,
        now: DateTime<Utc>,
    ) -> Self {
        let mut sources = Vec::new();
        for hit in &result.hits {
            if !sources.contains(&hit.source) {
                sources.push(hit.source);
            }
        }

        Self {
            id: Uuid::new_v4(),
            timestamp: now,
            site: context.site.clone(),
            trigger: context.trigger,
            action: final_action,
            risk_level: result.risk_level,
            hit_types: result.hits.iter().map(|h| h.category).collect(),
            hit_count: result.hits.len(),
            sources,
            warnings: result.warnings.clone(),
            error_code: Some(result.reason_code),
        }
    }

    /// Record a send attempt the gateway could not finish.
    pub fn fallback(site: &str, trigger: SendTrigger, message: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: now,
            site: site.to_string(),
            trigger,
            action: Action::Confirm,
            risk_level: RiskLevel::Medium,
            hit_types: Vec::new(),
            hit_count: 0,
            sources: Vec::new(),
            warnings: vec![Warning::GatewayFallback(message.to_string()).to_string()],
            error_code: Some(ReasonCode::EngineRuntimeError),
        }
    }

    /// Whether this record came from a gateway failure.
    pub fn is_fallback(&self) -> bool {
        self.warnings.iter().any(|w| w.starts_with("gateway-fallback:"))
    }
}
