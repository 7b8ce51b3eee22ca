//! Directory-based plugin discovery
//!
//! Every immediate subdirectory of the plugin directory holding a
//! `plugin.json` (preferred) or `plugin.yaml` descriptor is a candidate.
//! Candidates load in dependency order: a plugin whose `plugin` dependency
//! is not registered waits until another candidate provides it, and fails
//! with [`PluginError::MissingDependency`] when nothing does.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{PluginError, Result};
use crate::manager::PluginManager;
use crate::subprocess::SubprocessPlugin;
use crate::types::{DependencyKind, PluginDescriptor, PluginSource};

pub const JSON_DESCRIPTOR: &str = "plugin.json";
pub const YAML_DESCRIPTOR: &str = "plugin.yaml";

/// Outcome of loading a plugin directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Plugin names in load order
    pub loaded: Vec<String>,
    /// `(directory, message)` for every candidate that failed
    pub failed: Vec<(PathBuf, String)>,
}

/// Read the descriptor of one plugin directory
pub fn load_descriptor(dir: &Path) -> Result<PluginDescriptor> {
    let json = dir.join(JSON_DESCRIPTOR);
    if json.is_file() {
        let content = fs::read_to_string(&json)?;
        return serde_json::from_str(&content).map_err(|e| PluginError::Descriptor {
            path: json,
            message: e.to_string(),
        });
    }

    let yaml = dir.join(YAML_DESCRIPTOR);
    if yaml.is_file() {
        let content = fs::read_to_string(&yaml)?;
        return serde_yaml::from_str(&content).map_err(|e| PluginError::Descriptor {
            path: yaml,
            message: e.to_string(),
        });
    }

    Err(PluginError::Descriptor {
        path: dir.to_path_buf(),
        message: format!("no {} or {} found", JSON_DESCRIPTOR, YAML_DESCRIPTOR),
    })
}

/// Subdirectories of `plugin_dir` that contain a descriptor, sorted by name
pub fn discover(plugin_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(plugin_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|dir| dir.join(JSON_DESCRIPTOR).is_file() || dir.join(YAML_DESCRIPTOR).is_file())
        .collect()
}

fn plugin_dependencies(descriptor: &PluginDescriptor) -> impl Iterator<Item = &str> {
    descriptor
        .dependencies
        .iter()
        .filter(|d| d.kind == DependencyKind::Plugin)
        .map(|d| d.name.as_str())
}

impl PluginManager {
    /// Load a single plugin directory
    ///
    /// Every `plugin` dependency must already be registered.
    pub fn load_plugin(&self, dir: &Path) -> Result<String> {
        let descriptor = load_descriptor(dir)?;
        self.register_descriptor(descriptor, dir)
    }

    fn register_descriptor(&self, descriptor: PluginDescriptor, dir: &Path) -> Result<String> {
        if let Some(missing) = plugin_dependencies(&descriptor).find(|dep| !self.contains(dep)) {
            return Err(PluginError::MissingDependency {
                plugin: descriptor.name.clone(),
                dependency: missing.to_string(),
            });
        }

        let name = descriptor.name.clone();
        let priority = descriptor.priority;
        let plugin = SubprocessPlugin::new(descriptor, dir);
        self.insert(
            Arc::new(plugin),
            priority,
            PluginSource::Discovered {
                dir: dir.to_path_buf(),
            },
        )?;
        debug!(plugin = %name, path = %dir.display(), "Loaded plugin from directory");
        Ok(name)
    }

    /// Discover and load every plugin under `plugin_dir`
    ///
    /// Failures are recorded in the report rather than returned so one bad
    /// plugin does not prevent the others from loading.
    pub fn load_directory(&self, plugin_dir: &Path) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        if !plugin_dir.is_dir() {
            debug!(path = %plugin_dir.display(), "Plugin directory does not exist");
            return Ok(report);
        }

        let mut pending = Vec::new();
        for dir in discover(plugin_dir) {
            match load_descriptor(&dir) {
                Ok(descriptor) => pending.push((dir, descriptor)),
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping plugin with unreadable descriptor");
                    report.failed.push((dir, e.to_string()));
                }
            }
        }

        loop {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|(_, d)| plugin_dependencies(d).all(|dep| self.contains(dep)));
            pending = waiting;
            if ready.is_empty() {
                break;
            }
            for (dir, descriptor) in ready {
                match self.register_descriptor(descriptor, &dir) {
                    Ok(name) => report.loaded.push(name),
                    Err(e) => {
                        warn!(path = %dir.display(), error = %e, "Failed to load plugin");
                        report.failed.push((dir, e.to_string()));
                    }
                }
            }
        }

        for (dir, descriptor) in pending {
            let error = match plugin_dependencies(&descriptor).find(|dep| !self.contains(dep)) {
                Some(dependency) => PluginError::MissingDependency {
                    plugin: descriptor.name.clone(),
                    dependency: dependency.to_string(),
                },
                None => PluginError::Registry(format!("'{}' was not loaded", descriptor.name)),
            };
            warn!(plugin = %descriptor.name, error = %error, "Plugin dependency not satisfied");
            report.failed.push((dir, error.to_string()));
        }

        info!(
            path = %plugin_dir.display(),
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Loaded plugin directory"
        );
        Ok(report)
    }
}
