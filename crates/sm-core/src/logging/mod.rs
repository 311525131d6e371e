//! Structured logging for sentinel-mask.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for wrappers and agents
//!
//! # Usage
//!
//! ```no_run
//! use sm_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(0, false, None);
//! init_logging(&config);
//! tracing::warn!(site = "claude.ai", "guard log unavailable");
//! ```
//!
//! # Design Notes
//!
//! - stdout is reserved for command payloads (JSON or summary output)
//! - stderr receives all log output (human or JSONL)
//! - Events carry categories, counts, and actions; never message text

pub mod config;

pub use config::{cli_level, LevelSource, LogConfig, LogFormat};

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter.
const LOG_TARGETS: &[&str] = &[
    "sentinel_mask",
    "sm_core",
    "sm_guard",
    "sm_telemetry",
    "sm_common",
];

/// Filter directives for `level` across the workspace crates.
pub fn filter_directives(level: LevelFilter) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter for `config`. `RUST_LOG` directives apply only when nothing more
/// specific chose a level; invalid ones fall back to the workspace default.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    config
        .rust_log()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(filter_directives(config.level)))
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs.
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(use_ansi);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // Shorten to first 12 hex chars for readability
    format!("run-{}", &uuid.simple().to_string()[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        // Format: run-<12 hex chars>
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filter_directives() {
        let directives = filter_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("sentinel_mask=debug,"));
        assert!(directives.contains("sm_guard=debug"));
        assert_eq!(directives.split(',').count(), LOG_TARGETS.len());
    }

    #[test]
    fn test_filter_directives_parse() {
        assert!(EnvFilter::try_new(filter_directives(LevelFilter::OFF)).is_ok());
        assert!(EnvFilter::try_new(filter_directives(LevelFilter::ERROR)).is_ok());
    }

    fn config(vars: &'static [(&'static str, &'static str)], quiet: bool) -> LogConfig {
        LogConfig::from_lookup(
            move |key: &str| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string()),
            0,
            quiet,
            None,
        )
    }

    #[test]
    fn test_build_filter_uses_rust_log_without_flags() {
        let filter = build_filter(&config(&[("RUST_LOG", "sm_guard=trace")], false));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_build_filter_quiet_wins_over_rust_log() {
        let filter = build_filter(&config(&[("RUST_LOG", "trace")], true));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }
}
