//! RouteForge plugin pipeline
//!
//! Plugins observe and enrich the generation run at fixed lifecycle events.
//!
//! # Architecture
//!
//! 1. **Registry** (`manager`): owns plugins, their enabled state, priority,
//!    registration order and configuration behind a read/write lock
//! 2. **Dispatcher** (`dispatcher`): runs the plugins subscribed to one
//!    event strictly in sequence, sharing a mutable [`PluginContext`]
//! 3. **Built-ins** (`builtin`): `logging` and `metrics`, collected at
//!    compile time through `inventory`
//! 4. **Discovery** (`discovery`, `subprocess`): directory descriptors
//!    loaded as executables speaking a JSON stdin/stdout protocol
//!
//! # Ordering
//!
//! For one event, enabled plugins run by priority descending, then by
//! registration order ascending.
//!
//! # Example
//!
//! ```ignore
//! use routeforge_config::PluginSettings;
//! use routeforge_plugins::{LifecycleEvent, PluginContext, PluginManager};
//!
//! let manager = PluginManager::new(&PluginSettings::default());
//! manager.register_builtins()?;
//! manager.initialize_all()?;
//!
//! let mut ctx = PluginContext::new(LifecycleEvent::AfterScan).with_metadata("package_count", 3);
//! let report = manager.dispatch(LifecycleEvent::AfterScan, &mut ctx)?;
//! println!("ran {:?}", report.executed);
//! ```

pub mod builtin;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod manager;
pub mod plugin;
pub mod scaffold;
pub mod subprocess;
pub mod types;

pub use builtin::{builtin_factories, LoggingPlugin, MetricsPlugin, PluginFactory};
pub use discovery::{discover, load_descriptor, LoadReport};
pub use dispatcher::DispatchReport;
pub use error::{PluginError, Result};
pub use manager::PluginManager;
pub use plugin::{check_against_schema, Plugin, ALL_FRAMEWORKS};
pub use scaffold::scaffold_plugin;
pub use subprocess::SubprocessPlugin;
pub use types::{
    DependencyKind, LifecycleEvent, PluginConfig, PluginContext, PluginDependency,
    PluginDescriptor, PluginInfo, PluginSource,
};
