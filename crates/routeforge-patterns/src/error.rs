//! Error types for pattern tables

use thiserror::Error;

/// Result type for pattern table operations
pub type PatternResult<T> = Result<T, PatternError>;

/// Errors raised while building a rule table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// A name pattern is neither `Prefix*` nor `Prefix*Infix*`
    #[error("Invalid name pattern '{0}'")]
    InvalidPattern(String),

    /// A rule carries no name patterns
    #[error("Rule '{0}' has no name patterns")]
    EmptyRule(String),

    /// An HTTP verb could not be parsed
    #[error("Unknown HTTP method '{0}'")]
    UnknownMethod(String),
}
