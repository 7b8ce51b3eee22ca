//! Error types for project emission

use thiserror::Error;

/// Errors that can occur while emitting or writing a target project
///
/// An emission error is fatal for the target that raised it only; other
/// targets are unaffected.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Template missing from the target's template set
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template failed to compile
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Template failed to render
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Framework name outside the supported set
    #[error("Unsupported target framework: {0}")]
    UnsupportedTarget(String),

    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for emission
pub type Result<T> = std::result::Result<T, EmitError>;
