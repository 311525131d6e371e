//! SentinelMask common types, policies, settings, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Sensitive-data categories and severity scales
//! - Send-attempt context and the guard result contract
//! - Per-category rule policies
//! - Settings loading, patching, and validation
//! - Output format specifications

pub mod categories;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod policy;
pub mod result;

pub use categories::{Action, Category, MaskMode, RiskLevel, Source};
pub use config::{ConfigPaths, ConfigResolver, ConfigSource, GuardSettings, PolicyPatch, SettingsPatch};
pub use context::{InputKind, PreSendContext, SendTrigger};
pub use error::{Error, Result};
pub use output::OutputFormat;
pub use policy::{RulePolicy, RulePolicyMap};
pub use result::{GuardResult, HitSummary, ReasonCode, Warning};
