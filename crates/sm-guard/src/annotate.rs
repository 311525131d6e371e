//! Policy annotation: the active policy is authoritative over detector defaults.

use crate::detect::Hit;
use sm_common::RulePolicyMap;

/// Drop hits whose category is absent or disabled, and restamp the rest with
/// the policy's risk level and mask mode. Input order is preserved.
pub fn annotate(hits: &[Hit], policies: &RulePolicyMap) -> Vec<Hit> {
    hits.iter()
        .filter_map(|hit| match policies.get(hit.category) {
            Some(policy) if policy.enabled => Some(hit.with_policy(policy)),
            _ => None,
        })
        .collect()
}
