//! Logging configuration.
//!
//! The level comes from, in order: `-q`/`-v` on the command line,
//! `SENTINEL_MASK_LOG`, `RUST_LOG` (passed to the filter verbatim), then
//! `warn`. The format comes from `--log-format`, then
//! `SENTINEL_MASK_LOG_FORMAT`, then `human`.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

/// Where the effective filter came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    Cli,
    Env,
    /// Raw `RUST_LOG` directives.
    RustLog(String),
    Default,
}

/// Resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
    pub source: LevelSource,
}

/// Level requested by `-q` / `-v` flags, if any.
pub fn cli_level(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    if quiet {
        return Some(LevelFilter::ERROR);
    }
    match verbose {
        0 => None,
        1 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

impl LogConfig {
    pub fn from_env(verbose: u8, quiet: bool, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), verbose, quiet, cli_format)
    }

    pub fn from_lookup<F>(
        lookup: F,
        verbose: u8,
        quiet: bool,
        cli_format: Option<LogFormat>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = cli_format
            .or_else(|| {
                lookup("SENTINEL_MASK_LOG_FORMAT")
                    .and_then(|val| LogFormat::from_str(val.trim(), true).ok())
            })
            .unwrap_or_default();

        let env_level = lookup("SENTINEL_MASK_LOG").and_then(|val| val.trim().parse().ok());
        let rust_log = lookup("RUST_LOG").filter(|val| !val.trim().is_empty());

        let (level, source) = match (cli_level(verbose, quiet), env_level, rust_log) {
            (Some(level), _, _) => (level, LevelSource::Cli),
            (None, Some(level), _) => (level, LevelSource::Env),
            (None, None, Some(directives)) => {
                (LevelFilter::WARN, LevelSource::RustLog(directives))
            }
            (None, None, None) => (LevelFilter::WARN, LevelSource::Default),
        };

        LogConfig {
            format,
            level,
            source,
        }
    }

    /// `RUST_LOG` directives to hand to the filter, when they are in charge.
    pub fn rust_log(&self) -> Option<&str> {
        match &self.source {
            LevelSource::RustLog(directives) => Some(directives),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]), 0, false, None);
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.level, LevelFilter::WARN);
        assert_eq!(config.source, LevelSource::Default);
    }

    #[test]
    fn test_cli_level_flags() {
        assert_eq!(cli_level(0, false), None);
        assert_eq!(cli_level(1, false), Some(LevelFilter::DEBUG));
        assert_eq!(cli_level(3, false), Some(LevelFilter::TRACE));
        assert_eq!(cli_level(2, true), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_env_level_and_format() {
        let config = LogConfig::from_lookup(
            lookup(&[("SENTINEL_MASK_LOG", "debug"), ("SENTINEL_MASK_LOG_FORMAT", "jsonl")]),
            0,
            false,
            None,
        );
        assert_eq!(config.level, LevelFilter::DEBUG);
        assert_eq!(config.source, LevelSource::Env);
        assert_eq!(config.format, LogFormat::Jsonl);
    }

    #[test]
    fn test_own_variable_beats_rust_log() {
        let config = LogConfig::from_lookup(
            lookup(&[("SENTINEL_MASK_LOG", "error"), ("RUST_LOG", "trace")]),
            0,
            false,
            None,
        );
        assert_eq!(config.level, LevelFilter::ERROR);
        assert_eq!(config.rust_log(), None);
    }

    #[test]
    fn test_rust_log_kept_verbatim() {
        let config =
            LogConfig::from_lookup(lookup(&[("RUST_LOG", "sm_guard=trace")]), 0, false, None);
        assert_eq!(config.rust_log(), Some("sm_guard=trace"));
    }

    #[test]
    fn test_quiet_overrides_rust_log() {
        let config = LogConfig::from_lookup(lookup(&[("RUST_LOG", "trace")]), 0, true, None);
        assert_eq!(config.level, LevelFilter::ERROR);
        assert_eq!(config.source, LevelSource::Cli);
        assert_eq!(config.rust_log(), None);
    }

    #[test]
    fn test_cli_format_overrides_env() {
        let config = LogConfig::from_lookup(
            lookup(&[("SENTINEL_MASK_LOG_FORMAT", "jsonl")]),
            0,
            false,
            Some(LogFormat::Human),
        );
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_unparseable_env_ignored() {
        let config = LogConfig::from_lookup(
            lookup(&[("SENTINEL_MASK_LOG", "loud"), ("SENTINEL_MASK_LOG_FORMAT", "xml")]),
            0,
            false,
            None,
        );
        assert_eq!(config.level, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Human);
    }
}
