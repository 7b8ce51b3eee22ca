//! routeforge configuration management
//!
//! Typed configuration sections for scanning, route synthesis, validation,
//! plugins and target emission, loaded from defaults, an optional TOML file
//! and `ROUTEFORGE__*` environment variables.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    AuthSettings, CorsSettings, DeploymentSettings, DocsSettings, ForgeConfig, GeneratorConfig,
    LoggingConfig, PluginOverride, PluginSettings, TargetConfig, TargetKind, TestingSettings,
    ValidationSettings,
};
