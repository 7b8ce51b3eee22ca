//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use globset::Glob;
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::ForgeConfig,
};

const PROJECT_CONFIG_FILE: &str = "routeforge.toml";
const ENV_PREFIX: &str = "ROUTEFORGE";

/// Configuration manager
///
/// Layers built-in defaults, an optional TOML file and environment variables
/// (`ROUTEFORGE__GENERATOR__AUTO_CRUD=false`), later sources winning.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager that reads `./routeforge.toml`, falling back to the
    /// user config directory when the project file is absent
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Path this manager reads from and saves to
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.exists() {
            return project;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("routeforge")
            .join("config.toml")
    }

    /// Load configuration from every source and validate it
    pub fn load(&self) -> Result<ForgeConfig> {
        debug!(path = %self.config_path.display(), "Loading configuration");

        let defaults = Config::try_from(&ForgeConfig::default())?;
        let builder = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config = builder.build()?;
        let forge_config: ForgeConfig = config.try_deserialize()?;
        self.validate(&forge_config)?;
        Ok(forge_config)
    }

    /// Load configuration from a TOML string, ignoring files and environment
    pub fn load_from_str(content: &str) -> Result<ForgeConfig> {
        let forge_config: ForgeConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::new().validate(&forge_config)?;
        Ok(forge_config)
    }

    /// Persist configuration as TOML
    pub fn save(&self, config: &ForgeConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self, config: &ForgeConfig) -> Result<()> {
        let generator = &config.generator;
        if generator.include_patterns.is_empty() {
            return Err(ConfigError::Validation(
                "At least one include pattern is required".to_string(),
            ));
        }
        if generator.package_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Package name must not be empty".to_string(),
            ));
        }
        for pattern in generator
            .include_patterns
            .iter()
            .chain(generator.exclude_patterns.iter())
        {
            Glob::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        }
        if config.target.frameworks.is_empty() {
            return Err(ConfigError::Validation(
                "At least one target framework is required".to_string(),
            ));
        }
        if config.plugins.max_plugins == 0 {
            return Err(ConfigError::Validation(
                "max_plugins must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("missing.toml"))
            .with_env_prefix("ROUTEFORGE_TEST_NO_ENV");

        let config = manager.load().unwrap();
        assert_eq!(config, ForgeConfig::default());
    }

    #[test]
    fn test_load_reads_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routeforge.toml");
        std::fs::write(
            &path,
            r#"
[generator]
auto_crud = false
package_name = "shop-api"

[target]
frameworks = ["chi"]
"#,
        )
        .unwrap();

        let manager =
            ConfigManager::with_path(path).with_env_prefix("ROUTEFORGE_TEST_NO_ENV");
        let config = manager.load().unwrap();

        assert!(!config.generator.auto_crud);
        assert!(config.generator.smart_mapping);
        assert_eq!(config.generator.package_name, "shop-api");
        assert_eq!(config.target.frameworks, vec![TargetKind::Chi]);
    }

    #[test]
    fn test_save_then_load_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let manager =
            ConfigManager::with_path(path).with_env_prefix("ROUTEFORGE_TEST_NO_ENV");

        let mut config = ForgeConfig::default();
        config.generator.package_name = "inventory".to_string();
        config.plugins.sandbox_mode = false;
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.generator.package_name, "inventory");
        assert!(!loaded.plugins.sandbox_mode);
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let mut config = ForgeConfig::default();
        config.generator.exclude_patterns.push("[unclosed".to_string());
        assert!(ConfigManager::new().validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_frameworks() {
        let mut config = ForgeConfig::default();
        config.target.frameworks.clear();
        assert!(ConfigManager::new().validate(&config).is_err());
    }
}
