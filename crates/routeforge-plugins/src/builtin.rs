//! Built-in plugins and their compile-time registry
//!
//! Built-ins submit a [`PluginFactory`] through `inventory`; the manager
//! collects every factory linked into the binary when it registers
//! built-ins. Factories are applied in name order.

use std::sync::{Arc, Mutex, RwLock};

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::{PluginError, Result};
use crate::plugin::Plugin;
use crate::types::{LifecycleEvent, PluginConfig, PluginContext};

/// A built-in plugin constructor
pub struct PluginFactory {
    pub name: &'static str,
    pub create: fn() -> Arc<dyn Plugin>,
}

impl PluginFactory {
    pub const fn new(name: &'static str, create: fn() -> Arc<dyn Plugin>) -> Self {
        Self { name, create }
    }
}

inventory::collect!(PluginFactory);

inventory::submit! {
    PluginFactory::new("logging", create_logging_plugin)
}

inventory::submit! {
    PluginFactory::new("metrics", create_metrics_plugin)
}

fn create_logging_plugin() -> Arc<dyn Plugin> {
    Arc::new(LoggingPlugin::new())
}

fn create_metrics_plugin() -> Arc<dyn Plugin> {
    Arc::new(MetricsPlugin::new())
}

/// Every linked built-in factory, sorted by name
pub fn builtin_factories() -> Vec<&'static PluginFactory> {
    let mut factories: Vec<&'static PluginFactory> = inventory::iter::<PluginFactory>().collect();
    factories.sort_by_key(|f| f.name);
    factories
}

/// Emits a tracing event for each lifecycle event it observes
pub struct LoggingPlugin {
    config: RwLock<PluginConfig>,
}

impl LoggingPlugin {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(PluginConfig::new()),
        }
    }
}

impl LoggingPlugin {
    /// The dispatch-time configuration, or the one seen at initialization
    /// when the manager holds none for this plugin
    fn effective_config(&self, ctx: &PluginContext) -> Result<PluginConfig> {
        if !ctx.config.is_empty() {
            return Ok(ctx.config.clone());
        }
        let stored = self
            .config
            .read()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire read lock: {}", e)))?;
        Ok(stored.clone())
    }
}

impl Default for LoggingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "logging"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Logs every lifecycle event"
    }

    fn author(&self) -> &str {
        "RouteForge"
    }

    fn initialize(&self, config: &PluginConfig) -> Result<()> {
        let mut stored = self
            .config
            .write()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire write lock: {}", e)))?;
        *stored = config.clone();
        Ok(())
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        let config = self.effective_config(ctx)?;
        if !config.get("enabled").and_then(Value::as_bool).unwrap_or(true) {
            return Ok(());
        }

        let package = ctx.package.as_ref().map(|p| p.key.as_str()).unwrap_or("-");
        let route = ctx
            .route
            .as_ref()
            .map(|r| format!("{} {}", r.method, r.path))
            .unwrap_or_default();
        match config.get("level").and_then(Value::as_str) {
            Some("debug") => debug!(event = %ctx.event, package, route = %route, "Lifecycle event"),
            _ => info!(event = %ctx.event, package, route = %route, "Lifecycle event"),
        }
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::BeforeScan,
            LifecycleEvent::AfterScan,
            LifecycleEvent::BeforeGeneration,
            LifecycleEvent::AfterGeneration,
            LifecycleEvent::RouteGenerated,
        ]
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "level": {"type": "string", "default": "info"},
            }
        })
    }
}

#[derive(Debug, Default)]
struct Counters {
    packages_scanned: u64,
    routes_generated: u64,
}

/// Counts scanned packages and generated routes
///
/// The counters are published under `data["metrics"]` after every event
/// the plugin handles.
pub struct MetricsPlugin {
    counters: Mutex<Counters>,
}

impl MetricsPlugin {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
        }
    }
}

impl Default for MetricsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn metadata_count(metadata: &Map<String, Value>, key: &str) -> Option<u64> {
    metadata.get(key).and_then(Value::as_u64)
}

impl Plugin for MetricsPlugin {
    fn name(&self) -> &str {
        "metrics"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Collects scan and generation counters"
    }

    fn author(&self) -> &str {
        "RouteForge"
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire metrics lock: {}", e)))?;

        match ctx.event {
            LifecycleEvent::AfterScan => {
                if let Some(count) = metadata_count(&ctx.metadata, "package_count") {
                    counters.packages_scanned = count;
                }
            }
            LifecycleEvent::RouteGenerated => counters.routes_generated += 1,
            LifecycleEvent::AfterGeneration => {
                if let Some(count) = metadata_count(&ctx.metadata, "route_count") {
                    counters.routes_generated = count;
                }
            }
            _ => {}
        }

        ctx.data.insert(
            "metrics".to_string(),
            json!({
                "packages_scanned": counters.packages_scanned,
                "routes_generated": counters.routes_generated,
            }),
        );
        Ok(())
    }

    fn cleanup(&self) -> Result<()> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| PluginError::Registry(format!("Failed to acquire metrics lock: {}", e)))?;
        *counters = Counters::default();
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::AfterScan,
            LifecycleEvent::AfterGeneration,
            LifecycleEvent::RouteGenerated,
        ]
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "enabled": {"type": "boolean", "default": true},
                "output_format": {"type": "string", "default": "json"},
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use routeforge_config::PluginSettings;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;
    use crate::manager::PluginManager;

    struct LifecycleEventCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for LifecycleEventCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() == "routeforge_plugins::builtin" {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn logged_events(manager: &PluginManager) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(LifecycleEventCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, || {
            let mut ctx = PluginContext::new(LifecycleEvent::BeforeScan);
            manager.dispatch(LifecycleEvent::BeforeScan, &mut ctx).unwrap();
        });
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_logging_honours_config_set_after_initialize() {
        let manager = PluginManager::new(&PluginSettings::default());
        manager.register_builtins().unwrap();
        manager.initialize_all().unwrap();
        assert_eq!(logged_events(&manager), 1);

        let mut disabled = PluginConfig::new();
        disabled.insert("enabled".to_string(), json!(false));
        manager.configure("logging", disabled).unwrap();
        assert_eq!(logged_events(&manager), 0);
    }

    #[test]
    fn test_logging_falls_back_to_initialized_config() {
        let plugin = LoggingPlugin::new();
        let mut config = PluginConfig::new();
        config.insert("level".to_string(), json!("debug"));
        plugin.initialize(&config).unwrap();

        let ctx = PluginContext::new(LifecycleEvent::AfterScan);
        assert_eq!(plugin.effective_config(&ctx).unwrap()["level"], "debug");

        let mut overridden = PluginContext::new(LifecycleEvent::AfterScan);
        overridden.config.insert("level".to_string(), json!("info"));
        assert_eq!(plugin.effective_config(&overridden).unwrap()["level"], "info");
    }

    #[test]
    fn test_builtin_factories_registered() {
        let names: Vec<&str> = builtin_factories().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["logging", "metrics"]);
        for factory in builtin_factories() {
            assert_eq!((factory.create)().name(), factory.name);
        }
    }

    #[test]
    fn test_metrics_counts_routes() {
        let plugin = MetricsPlugin::new();
        let mut scan = PluginContext::new(LifecycleEvent::AfterScan).with_metadata("package_count", 4);
        plugin.execute(&mut scan).unwrap();

        for _ in 0..3 {
            let mut route = PluginContext::new(LifecycleEvent::RouteGenerated);
            plugin.execute(&mut route).unwrap();
        }
        let mut last = PluginContext::new(LifecycleEvent::RouteGenerated);
        plugin.execute(&mut last).unwrap();
        assert_eq!(
            last.data["metrics"],
            json!({"packages_scanned": 4, "routes_generated": 4})
        );

        plugin.cleanup().unwrap();
        let mut after = PluginContext::new(LifecycleEvent::BeforeScan);
        plugin.execute(&mut after).unwrap();
        assert_eq!(after.data["metrics"]["routes_generated"], 0);
    }

    #[test]
    fn test_logging_rejects_bad_config() {
        let plugin = LoggingPlugin::new();
        let mut config = PluginConfig::new();
        config.insert("enabled".to_string(), json!("sometimes"));
        assert!(matches!(
            plugin.validate_config(&config),
            Err(PluginError::InvalidConfig { .. })
        ));
        config.insert("enabled".to_string(), json!(false));
        assert!(plugin.validate_config(&config).is_ok());
    }
}
