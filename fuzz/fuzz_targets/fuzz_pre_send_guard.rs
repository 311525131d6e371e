//! Fuzz target for the full pre-send guard pipeline.
//!
//! Arbitrary text, trigger and composing flag must never panic, and the
//! result must stay consistent with the risk-to-action mapping.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sm_common::{PreSendContext, ReasonCode, RulePolicyMap, SendTrigger};
use sm_guard::{action_for_risk, pre_send_guard};

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    trigger: u8,
    composing: bool,
}

fn trigger(tag: u8) -> SendTrigger {
    match tag % 6 {
        0 => SendTrigger::Enter,
        1 => SendTrigger::CtrlEnter,
        2 => SendTrigger::ButtonClick,
        3 => SendTrigger::Submit,
        4 => SendTrigger::Programmatic,
        _ => SendTrigger::Unknown,
    }
}

fuzz_target!(|input: Input| {
    let context = PreSendContext::new("chatgpt.com", trigger(input.trigger), input.text.clone())
        .composing(input.composing);
    let result = pre_send_guard(&context, &RulePolicyMap::default());

    assert_eq!(result.action, action_for_risk(result.risk_level));

    if input.composing {
        assert_eq!(result.masked_text, input.text);
        assert!(result.hits.is_empty());
        assert_eq!(result.reason_code, ReasonCode::ImeComposing);
        return;
    }

    if result.hits.is_empty() && result.reason_code == ReasonCode::None {
        assert_eq!(result.masked_text, input.text);
    }

    // Masked output is itself valid guard input.
    let again = PreSendContext::new("chatgpt.com", SendTrigger::Enter, result.masked_text);
    let _ = pre_send_guard(&again, &RulePolicyMap::default());
});
