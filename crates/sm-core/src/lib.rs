//! SentinelMask Core Library
//!
//! This library provides the send-time glue around the guard:
//! - The pre-send gateway (guard, confirm, log, fallback)
//! - Confirmation surfaces
//! - Exit codes for CLI operations
//! - Logging setup
//!
//! The binary entry point is in `main.rs`.

pub mod confirm;
pub mod exit_codes;
pub mod gateway;
pub mod logging;

pub use confirm::{AutoDecision, ConfirmRequest, ConfirmationSurface, TerminalPrompt};
pub use gateway::{GatewayError, LogSink, PersistentLog, PreSendGateway, SendOutcome};
