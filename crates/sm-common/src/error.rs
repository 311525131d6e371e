//! Error types for settings and shared I/O.
//!
//! Errors carry a stable code and a remediation hint so the CLI can report
//! them to humans and automation alike:
//!
//! ```text
//! ✗ Configuration Error
//!   Reason: invalid settings: max_log_entries must be at least 1
//!   Fix: Run 'sentinel-mask config reset' to restore defaults
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for shared operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Settings file or value errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for settings handling.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid settings: {0}")]
    InvalidConfig(String),

    #[error("config directory could not be resolved")]
    NoConfigDir,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable error code.
    ///
    /// - 10-19: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidConfig(_) => 10,
            Error::NoConfigDir => 11,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig(_) | Error::NoConfigDir => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "Run 'sentinel-mask config reset' to restore defaults",
            Error::NoConfigDir => "Pass --config <dir> or set SENTINEL_MASK_CONFIG",
            Error::Io(_) => "Check file permissions and available disk space",
            Error::Json(_) => "Fix the JSON syntax or reset the file to defaults",
        }
    }

    /// Headline for human output.
    pub fn headline(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Configuration Error",
            ErrorCategory::Io => "I/O Error",
        }
    }

    /// Multi-line human rendering.
    pub fn format_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured form of an error for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub remediation: String,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
        }
    }
}
