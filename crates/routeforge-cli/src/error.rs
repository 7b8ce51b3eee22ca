use routeforge_config::ConfigError;
use routeforge_engine::EngineError;
use routeforge_plugins::PluginError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{failed} of {total} targets failed")]
    GenerationFailed { failed: usize, total: usize },

    #[error("Field '{field}' failed {count} check(s)")]
    ValidationFailed { field: String, count: usize },
}

impl CliError {
    /// Message with a hint on what to try next
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'routeforge --help' for usage information.",
                    message
                )
            }
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nCheck routeforge.toml or pass --config <FILE>.",
                    e
                )
            }
            CliError::GenerationFailed { .. } => {
                format!("{}\n\nSee the target errors above; other targets were written.", self)
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
