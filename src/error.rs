//! Error types for the highlighting core

use thiserror::Error;

/// Result type alias for highlighting operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
///
/// `GrammarNotFound`, `TokenizationFailure` and `RebuildAborted` never
/// escape the core: callers see plain text instead.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("No grammar for language: {0}")]
    GrammarNotFound(String),

    #[error("Tokenization failed in {grammar}: {reason}")]
    TokenizationFailure { grammar: String, reason: String },

    #[error("Rebuild aborted")]
    RebuildAborted,

    #[error("Invalid pattern in rule {rule}: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
