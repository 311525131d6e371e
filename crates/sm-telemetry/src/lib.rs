//! SentinelMask guard log storage.
//!
//! This crate provides:
//! - The per-send log record derived from a guard result
//! - Retention pruning by age, entry count, and serialized size
//! - JSON file persistence with atomic replace

pub mod entry;
pub mod retention;
pub mod writer;

pub use entry::GuardLogEntry;
pub use retention::{LogStore, LogStoreConfig, PruneSummary};
pub use writer::{LogFile, LogStoreError};
