//! Scanner error types

use std::path::PathBuf;

use thiserror::Error;

/// Scanner operation errors
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Tree-sitter error: {message}")]
    TreeSitter { message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("No parsable units: {matched} matched, none parsed")]
    NoParsableUnits { matched: usize },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;
