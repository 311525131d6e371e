//! Fuzz target for settings.json parsing.
//!
//! Any patch that parses must normalize into settings that either validate
//! or fail with a config error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sm_common::{GuardSettings, SettingsPatch};

fuzz_target!(|data: &[u8]| {
    let Ok(patch) = serde_json::from_slice::<SettingsPatch>(data) else {
        return;
    };
    let settings = GuardSettings::normalize(&patch);
    if settings.validate().is_ok() {
        assert!(settings.rule_policies.is_total());
        let _ = settings.is_site_allowed("chatgpt.com");
    }
});
