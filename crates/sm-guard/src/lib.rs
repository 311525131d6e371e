//! Pre-send guard pipeline for SentinelMask.
//!
//! A pure, synchronous transformation from `(raw text, send context, rule
//! policies)` to a [`GuardResult`](sm_common::GuardResult): masked text, an
//! aggregated risk level, an action, hit summaries, and warnings.
//!
//! # Stages
//!
//! - **Detection**: per-category regex matchers with boundary checks and a
//!   Luhn checksum for card numbers.
//! - **Annotation**: the active policy filters hits and sets their severity.
//! - **Risk decision**: max over hits, category risk floors, and escalation
//!   for unclassified send triggers.
//! - **Masking**: right-to-left, overlap-safe redaction per mask mode.
//! - **Orchestration**: composing bypass and a fail-toward-confirm fallback.
//!
//! # Example
//!
//! ```
//! use sm_common::{Action, PreSendContext, RulePolicyMap, SendTrigger};
//! use sm_guard::pre_send_guard;
//!
//! let context = PreSendContext::new(
//!     "chatgpt.com",
//!     SendTrigger::Enter,
//!     "token sk-proj-abcdefghijklmnopqrstuvwxyz",
//! );
//! let result = pre_send_guard(&context, &RulePolicyMap::default());
//! assert_eq!(result.action, Action::Block);
//! assert_eq!(result.masked_text, "token [API_KEY]");
//! ```

pub mod annotate;
pub mod detect;
pub mod engine;
pub mod error;
pub mod luhn;
pub mod mask;
pub mod risk;

pub use annotate::annotate;
pub use detect::{detect, EnabledCategories, Hit};
pub use engine::{pre_send_guard, GuardEngine};
pub use error::{GuardError, Result};
pub use luhn::is_valid_luhn;
pub use mask::{mask, partial_mask, placeholder, MaskOutcome};
pub use risk::{action_for_risk, decide, risk_floor, RiskDecision};
