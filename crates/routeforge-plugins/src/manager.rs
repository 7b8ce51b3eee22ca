//! Plugin registry
//!
//! The registry is guarded by a read/write lock so introspection (list,
//! enable, disable, configure) is safe between dispatches. Dispatch itself
//! lives in [`crate::dispatcher`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use routeforge_config::PluginSettings;
use tracing::{debug, info, warn};

use crate::builtin::builtin_factories;
use crate::error::{PluginError, Result};
use crate::plugin::Plugin;
use crate::types::{LifecycleEvent, PluginConfig, PluginInfo, PluginSource};

/// Registry state of one plugin
pub(crate) struct PluginEntry {
    pub(crate) plugin: Arc<dyn Plugin>,
    pub(crate) enabled: bool,
    pub(crate) priority: i32,
    pub(crate) order: usize,
    /// Events declared at registration
    pub(crate) events: Vec<LifecycleEvent>,
    pub(crate) config: PluginConfig,
    pub(crate) source: PluginSource,
}

/// A plugin scheduled for one dispatch
pub(crate) struct Scheduled {
    pub(crate) name: String,
    pub(crate) plugin: Arc<dyn Plugin>,
    pub(crate) config: PluginConfig,
}

/// Owned plugin registry for one run
pub struct PluginManager {
    settings: PluginSettings,
    entries: RwLock<BTreeMap<String, PluginEntry>>,
    next_order: AtomicUsize,
}

impl PluginManager {
    /// Create an empty registry
    pub fn new(settings: &PluginSettings) -> Self {
        Self {
            settings: settings.clone(),
            entries: RwLock::new(BTreeMap::new()),
            next_order: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Whether plugin failures are logged instead of aborting
    pub fn sandbox_mode(&self) -> bool {
        self.settings.sandbox_mode
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, PluginEntry>>> {
        self.entries
            .read()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, PluginEntry>>> {
        self.entries
            .write()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire write lock: {}", e)))
    }

    /// Register every linked built-in plugin
    pub fn register_builtins(&self) -> Result<usize> {
        let mut count = 0;
        for factory in builtin_factories() {
            self.insert((factory.create)(), None, PluginSource::Builtin)?;
            count += 1;
        }
        info!(plugin_count = count, "Registered built-in plugins");
        Ok(count)
    }

    /// Register a plugin supplied by the host program
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.insert(plugin, None, PluginSource::Registered)
    }

    /// Register a plugin with an explicit priority
    pub fn register_with_priority(&self, plugin: Arc<dyn Plugin>, priority: i32) -> Result<()> {
        self.insert(plugin, Some(priority), PluginSource::Registered)
    }

    /// Register a plugin
    ///
    /// Priority comes from the settings override, then `priority`, then 0.
    /// A plugin starts enabled when the enabled list is empty or names it,
    /// the disabled list does not name it, and no override disables it.
    pub(crate) fn insert(
        &self,
        plugin: Arc<dyn Plugin>,
        priority: Option<i32>,
        source: PluginSource,
    ) -> Result<()> {
        let name = plugin.name().to_string();
        let overrides = self.settings.plugins.get(&name);
        let config = overrides.map(|o| o.config.clone()).unwrap_or_default();
        if !config.is_empty() {
            plugin.validate_config(&config)?;
        }

        let mut entries = self.write()?;
        if entries.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }
        if entries.len() >= self.settings.max_plugins {
            return Err(PluginError::LimitReached(self.settings.max_plugins));
        }

        let allowed = self.settings.enabled_plugins.is_empty()
            || self.settings.enabled_plugins.contains(&name);
        let mut enabled = allowed && !self.settings.disabled_plugins.contains(&name);
        if let Some(flag) = overrides.and_then(|o| o.enabled) {
            enabled = flag && enabled;
        }
        let priority = overrides
            .and_then(|o| o.priority)
            .or(priority)
            .unwrap_or(0);
        let order = self.next_order.fetch_add(1, Ordering::SeqCst);
        let events = plugin.supported_events();

        debug!(
            plugin = %name,
            priority,
            order,
            enabled,
            event_count = events.len(),
            "Registered plugin"
        );
        entries.insert(
            name,
            PluginEntry {
                plugin,
                enabled,
                priority,
                order,
                events,
                config,
                source,
            },
        );
        Ok(())
    }

    /// Remove a plugin, returning it
    pub fn unregister(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        let mut entries = self.write()?;
        entries
            .remove(name)
            .map(|e| e.plugin)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<Option<Arc<dyn Plugin>>> {
        Ok(self.read()?.get(name).map(|e| Arc::clone(&e.plugin)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().map(|e| e.contains_key(name)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut entries = self.write()?;
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        entry.enabled = enabled;
        debug!(plugin = %name, enabled, "Changed plugin state");
        Ok(())
    }

    pub fn set_priority(&self, name: &str, priority: i32) -> Result<()> {
        let mut entries = self.write()?;
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        entry.priority = priority;
        Ok(())
    }

    /// Validate and store a plugin's configuration
    ///
    /// Nothing is stored when the plugin rejects the configuration.
    pub fn configure(&self, name: &str, config: PluginConfig) -> Result<()> {
        let plugin = self
            .get(name)?
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        plugin.validate_config(&config)?;

        let mut entries = self.write()?;
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        entry.config = config;
        Ok(())
    }

    /// Every plugin in execution order (priority descending, order ascending)
    pub fn list(&self) -> Result<Vec<PluginInfo>> {
        let entries = self.read()?;
        let mut infos: Vec<PluginInfo> = entries
            .iter()
            .map(|(name, e)| PluginInfo {
                name: name.clone(),
                version: e.plugin.version().to_string(),
                description: e.plugin.description().to_string(),
                author: e.plugin.author().to_string(),
                enabled: e.enabled,
                priority: e.priority,
                order: e.order,
                events: e.events.clone(),
                source: e.source.clone(),
                config: e.config.clone(),
            })
            .collect();
        infos.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
        Ok(infos)
    }

    /// Enabled plugins subscribed to `event`, in execution order
    pub(crate) fn schedule(&self, event: Option<LifecycleEvent>) -> Result<Vec<Scheduled>> {
        let entries = self.read()?;
        let mut selected: Vec<(&String, &PluginEntry)> = entries
            .iter()
            .filter(|(_, e)| e.enabled)
            .filter(|(_, e)| event.map_or(true, |ev| e.events.contains(&ev)))
            .collect();
        selected.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
        Ok(selected
            .into_iter()
            .map(|(name, e)| Scheduled {
                name: name.clone(),
                plugin: Arc::clone(&e.plugin),
                config: e.config.clone(),
            })
            .collect())
    }

    /// Names that would run for `event`, in execution order
    pub fn execution_order(&self, event: LifecycleEvent) -> Result<Vec<String>> {
        Ok(self
            .schedule(Some(event))?
            .into_iter()
            .map(|s| s.name)
            .collect())
    }

    /// Initialize enabled plugins in execution order
    pub fn initialize_all(&self) -> Result<()> {
        for scheduled in self.schedule(None)? {
            scheduled.plugin.initialize(&scheduled.config).map_err(|e| {
                PluginError::execution(&scheduled.name, "initialize", e.to_string())
            })?;
            debug!(plugin = %scheduled.name, "Initialized plugin");
        }
        Ok(())
    }

    /// Clean up enabled plugins in execution order
    ///
    /// Every plugin is attempted; the first failure is returned.
    pub fn cleanup_all(&self) -> Result<()> {
        let mut first_error = None;
        for scheduled in self.schedule(None)? {
            if let Err(e) = scheduled.plugin.cleanup() {
                warn!(plugin = %scheduled.name, error = %e, "Plugin cleanup failed");
                first_error
                    .get_or_insert_with(|| PluginError::execution(&scheduled.name, "cleanup", e.to_string()));
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
