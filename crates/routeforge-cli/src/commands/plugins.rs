// List and scaffold plugins

use std::path::PathBuf;

use routeforge_config::ForgeConfig;
use routeforge_engine::ForgeContext;
use routeforge_plugins::{scaffold_plugin, LifecycleEvent, PluginInfo, PluginSource};

use super::Command;
use crate::error::CliResult;
use crate::output::{self, column};

const DEFAULT_PLUGIN_DIR: &str = "plugins";

#[derive(Debug, Clone)]
pub enum PluginsAction {
    List {
        json: bool,
    },
    Scaffold {
        name: String,
        dir: Option<PathBuf>,
        events: Vec<LifecycleEvent>,
    },
}

/// `routeforge plugins list|scaffold`
pub struct PluginsCommand {
    pub action: PluginsAction,
}

impl PluginsCommand {
    pub fn new(action: PluginsAction) -> Self {
        Self { action }
    }

    fn list(&self, config: &ForgeConfig, json: bool) -> CliResult<()> {
        let ctx = ForgeContext::new(config.clone())?;
        let plugins = ctx.plugins().list()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&plugins)?);
        } else {
            for info in &plugins {
                println!("{}", describe(info));
            }
        }
        if let Some(load) = ctx.plugin_load() {
            for (path, reason) in &load.failed {
                output::print_warning(&format!("not loaded {}: {}", path.display(), reason));
            }
        }
        ctx.shutdown()?;
        Ok(())
    }

    fn scaffold(
        &self,
        config: &ForgeConfig,
        name: &str,
        dir: Option<&PathBuf>,
        events: &[LifecycleEvent],
    ) -> CliResult<()> {
        let parent = dir
            .cloned()
            .or_else(|| config.plugins.plugin_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_DIR));
        let created = scaffold_plugin(&parent, name, events)?;
        output::print_success(&format!("Created plugin {} in {}", name, created.display()));
        Ok(())
    }
}

impl Command for PluginsCommand {
    fn execute(&self, config: &ForgeConfig) -> CliResult<()> {
        match &self.action {
            PluginsAction::List { json } => self.list(config, *json),
            PluginsAction::Scaffold { name, dir, events } => {
                self.scaffold(config, name, dir.as_ref(), events)
            }
        }
    }
}

fn describe(info: &PluginInfo) -> String {
    let source = match &info.source {
        PluginSource::Builtin => "builtin".to_string(),
        PluginSource::Registered => "registered".to_string(),
        PluginSource::Discovered { dir } => dir.display().to_string(),
    };
    let events: Vec<&str> = info.events.iter().map(|e| e.as_str()).collect();
    format!(
        "{} {} priority={} {} [{}] {}",
        column(&info.name, 12),
        column(&info.version, 8),
        info.priority,
        if info.enabled { "enabled " } else { "disabled" },
        events.join(","),
        source
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_into_explicit_dir() {
        let temp = TempDir::new().unwrap();
        let command = PluginsCommand::new(PluginsAction::Scaffold {
            name: "audit".to_string(),
            dir: Some(temp.path().to_path_buf()),
            events: vec![LifecycleEvent::AfterGeneration],
        });

        command.execute(&ForgeConfig::default()).unwrap();
        assert!(temp.path().join("audit/plugin.json").is_file());
    }

    #[test]
    fn test_scaffold_falls_back_to_plugin_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = ForgeConfig::default();
        config.plugins.plugin_dir = Some(temp.path().join("custom"));

        PluginsCommand::new(PluginsAction::Scaffold {
            name: "audit".to_string(),
            dir: None,
            events: Vec::new(),
        })
        .execute(&config)
        .unwrap();
        assert!(temp.path().join("custom/audit").is_dir());
    }

    #[test]
    fn test_describe_builtin() {
        let ctx = ForgeContext::new(ForgeConfig::default()).unwrap();
        let plugins = ctx.plugins().list().unwrap();
        let logging = plugins.iter().find(|p| p.name == "logging").unwrap();
        let line = describe(logging);
        assert!(line.starts_with("logging"));
        assert!(line.ends_with("builtin"));
    }
}
