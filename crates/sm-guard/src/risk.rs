//! Risk aggregation and the risk-to-action mapping.

use crate::detect::Hit;
use sm_common::{Action, Category, PreSendContext, RiskLevel, Warning};

/// Aggregated verdict for one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskDecision {
    pub risk_level: RiskLevel,
    pub action: Action,
    pub warnings: Vec<Warning>,
}

impl RiskDecision {
    fn new(risk_level: RiskLevel, warnings: Vec<Warning>) -> Self {
        Self {
            risk_level,
            action: action_for_risk(risk_level),
            warnings,
        }
    }
}

/// Lowest risk a hit of this category may resolve to.
pub fn risk_floor(category: Category) -> RiskLevel {
    match category {
        Category::BankCard | Category::ApiKey => RiskLevel::Medium,
        Category::Name | Category::Phone | Category::Email | Category::Custom => RiskLevel::Low,
    }
}

/// The only place an action is derived from a risk level.
pub fn action_for_risk(risk_level: RiskLevel) -> Action {
    match risk_level {
        RiskLevel::High => Action::Block,
        RiskLevel::Medium => Action::Confirm,
        RiskLevel::Low => Action::Allow,
    }
}

/// Combine annotated hits and the send trigger into one risk level and action.
pub fn decide(context: &PreSendContext, hits: &[Hit]) -> RiskDecision {
    let mut warnings = Vec::new();
    let mut risk_level = RiskLevel::Low;

    for hit in hits {
        let floor = risk_floor(hit.category);
        let effective = if hit.risk_level < floor {
            warnings.push(Warning::RiskFloor(hit.category));
            floor
        } else {
            hit.risk_level
        };
        risk_level = risk_level.max(effective);
    }

    // An unclassified send is suspicious on its own.
    if context.trigger.is_unknown() && risk_level == RiskLevel::Low {
        risk_level = RiskLevel::Medium;
        warnings.push(Warning::UnknownTrigger);
    }

    RiskDecision::new(risk_level, warnings)
}
