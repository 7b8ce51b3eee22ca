//! Engine errors
//!
//! Each variant wraps the error of the stage that failed. Per-target
//! emission failures are not errors at this level; they are recorded in the
//! [`crate::GenerationReport`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] routeforge_config::ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] routeforge_scanner::ScanError),

    #[error("Route synthesis error: {0}")]
    Route(#[from] routeforge_routes::RouteError),

    #[error("Validation error: {0}")]
    Validation(#[from] routeforge_validation::ValidationError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] routeforge_plugins::PluginError),

    #[error("Emission error: {0}")]
    Emit(#[from] routeforge_emitters::EmitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
