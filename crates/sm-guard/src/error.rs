//! Error types for the guard pipeline.
//!
//! These never leave [`crate::GuardEngine::evaluate`]; the engine folds them
//! into the fallback result.

use sm_common::Category;
use thiserror::Error;

/// Result type for guard pipeline stages.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Faults a pipeline stage can raise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The policy map has no entry for a category the pipeline needs.
    #[error("missing policy for category {0}")]
    MissingPolicy(Category),

    /// A hit points outside the text it was detected in.
    #[error("span {start}+{length} exceeds text length {text_len} for {category}")]
    SpanOutOfBounds {
        category: Category,
        start: usize,
        length: usize,
        text_len: usize,
    },
}
