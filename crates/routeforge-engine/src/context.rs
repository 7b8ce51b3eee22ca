//! Owned run context
//!
//! Everything that used to be process-wide (validation engine, plugin
//! registry, rule table) is built once here and passed by reference.

use routeforge_config::ForgeConfig;
use routeforge_patterns::PatternMapper;
use routeforge_plugins::{LoadReport, PluginManager};
use routeforge_validation::ValidationEngine;
use tracing::{info, warn};

use crate::error::Result;

/// Configuration plus the registries one run needs
pub struct ForgeContext {
    config: ForgeConfig,
    validation: ValidationEngine,
    plugins: PluginManager,
    mapper: PatternMapper,
    plugin_load: Option<LoadReport>,
}

impl ForgeContext {
    /// Build registries from `config`
    ///
    /// Built-in plugins are always registered. Directory plugins are loaded
    /// when `plugins.auto_load` is set and a plugin directory is configured;
    /// descriptors that fail to load are logged and left out.
    pub fn new(config: ForgeConfig) -> Result<Self> {
        let validation = ValidationEngine::new(&config.validation)?;
        let plugins = PluginManager::new(&config.plugins);
        plugins.register_builtins()?;

        let plugin_load = match (&config.plugins.plugin_dir, config.plugins.auto_load) {
            (Some(dir), true) if dir.is_dir() => {
                let report = plugins.load_directory(dir)?;
                for (path, reason) in &report.failed {
                    warn!(path = %path.display(), reason = %reason, "Plugin not loaded");
                }
                Some(report)
            }
            _ => None,
        };
        plugins.initialize_all()?;

        info!(
            plugin_count = plugins.len(),
            rule_count = validation.rules().len(),
            targets = config.target.frameworks.len(),
            "Forge context ready"
        );

        Ok(Self {
            config,
            validation,
            plugins,
            mapper: PatternMapper::new(),
            plugin_load,
        })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn validation(&self) -> &ValidationEngine {
        &self.validation
    }

    pub fn validation_mut(&mut self) -> &mut ValidationEngine {
        &mut self.validation
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn mapper(&self) -> &PatternMapper {
        &self.mapper
    }

    /// Outcome of the plugin directory load, if one ran
    pub fn plugin_load(&self) -> Option<&LoadReport> {
        self.plugin_load.as_ref()
    }

    /// Release plugin resources
    pub fn shutdown(&self) -> Result<()> {
        self.plugins.cleanup_all()?;
        Ok(())
    }
}
