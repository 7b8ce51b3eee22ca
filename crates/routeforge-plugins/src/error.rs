//! Error types for the plugin pipeline
//!
//! Two conditions from the run's failure policy live here:
//!
//! 1. **Dependency errors** are raised while loading a plugin whose declared
//!    plugin dependency is not registered. They stop that plugin from loading.
//! 2. **Execution errors** are raised by a plugin during dispatch. In sandbox
//!    mode they are logged and dispatch continues; otherwise they abort the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the plugin pipeline
#[derive(Debug, Error)]
pub enum PluginError {
    /// No plugin with this name is registered
    #[error("Plugin not found: {0}")]
    NotFound(String),

    /// A plugin with this name is already registered
    #[error("Plugin already registered: {0}")]
    AlreadyRegistered(String),

    /// Registering another plugin would exceed `max_plugins`
    #[error("Plugin limit of {0} reached")]
    LimitReached(usize),

    /// A declared plugin dependency is neither registered nor loadable
    #[error("Plugin '{plugin}' depends on missing plugin '{dependency}'")]
    MissingDependency { plugin: String, dependency: String },

    /// A plugin failed while handling an event
    #[error("Plugin '{plugin}' failed on {event}: {message}")]
    Execution {
        plugin: String,
        event: String,
        message: String,
    },

    /// Configuration rejected by the plugin's `validate_config`
    #[error("Invalid configuration for plugin '{plugin}': {message}")]
    InvalidConfig { plugin: String, message: String },

    /// A plugin descriptor is missing or malformed
    #[error("Invalid plugin descriptor in {path}: {message}")]
    Descriptor { path: PathBuf, message: String },

    /// Event name outside the fixed lifecycle set
    #[error("Unknown lifecycle event: {0}")]
    UnknownEvent(String),

    /// Scaffolding could not create the plugin skeleton
    #[error("Cannot scaffold plugin: {0}")]
    Scaffold(String),

    /// Registry lock was poisoned or plugin state is unavailable
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl PluginError {
    /// Wrap a message as an execution failure of `plugin` on `event`
    pub fn execution(
        plugin: impl Into<String>,
        event: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::Execution {
            plugin: plugin.into(),
            event: event.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;
