//! Registry-level validation errors
//!
//! Validating a value never fails with these; problems with a value or a
//! rule's configuration come back inside a [`crate::ValidationResult`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while managing the rule registry
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Invalid rule '{name}': {message}")]
    InvalidRule { name: String, message: String },

    #[error("Failed to read rule file {path}: {source}")]
    RuleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ValidationError>;
