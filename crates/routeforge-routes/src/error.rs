//! Route synthesis errors

use thiserror::Error;

/// Errors raised by route synthesis in strict mode
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid HTTP method '{method}' on {owner}")]
    InvalidMethod { owner: String, method: String },

    #[error("Empty route path on {owner}")]
    EmptyPath { owner: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for route operations
pub type Result<T> = std::result::Result<T, RouteError>;
