//! Core data types for the plugin pipeline
//!
//! Lifecycle events, the context passed to plugins, plugin descriptors and
//! the registry's view of a plugin.

use std::fmt;
use std::str::FromStr;

use routeforge_routes::RouteSpec;
use routeforge_scanner::{PackageModel, TypeModel};
use routeforge_validation::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PluginError;

/// Free-form plugin configuration
pub type PluginConfig = Map<String, Value>;

/// Fixed lifecycle events plugins subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    BeforeScan,
    AfterScan,
    BeforeGeneration,
    AfterGeneration,
    RouteGenerated,
    ValidationError,
    Middleware,
    Custom,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::BeforeScan,
        LifecycleEvent::AfterScan,
        LifecycleEvent::BeforeGeneration,
        LifecycleEvent::AfterGeneration,
        LifecycleEvent::RouteGenerated,
        LifecycleEvent::ValidationError,
        LifecycleEvent::Middleware,
        LifecycleEvent::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeforeScan => "before_scan",
            LifecycleEvent::AfterScan => "after_scan",
            LifecycleEvent::BeforeGeneration => "before_generation",
            LifecycleEvent::AfterGeneration => "after_generation",
            LifecycleEvent::RouteGenerated => "route_generated",
            LifecycleEvent::ValidationError => "validation_error",
            LifecycleEvent::Middleware => "middleware",
            LifecycleEvent::Custom => "custom",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LifecycleEvent::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PluginError::UnknownEvent(s.to_string()))
    }
}

/// What a dependency refers to; only `plugin` dependencies gate loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    #[default]
    Plugin,
    Module,
    Service,
}

/// A declared plugin dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependency {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,
}

impl PluginDependency {
    /// A dependency on another plugin
    pub fn plugin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            kind: DependencyKind::Plugin,
        }
    }
}

/// Contents of a `plugin.json` or `plugin.yaml` descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Executable, relative to the descriptor's directory
    pub main_file: String,
    #[serde(default)]
    pub dependencies: Vec<PluginDependency>,
    #[serde(default)]
    pub supported_frameworks: Vec<String>,
    #[serde(default)]
    pub supported_events: Vec<LifecycleEvent>,
    #[serde(default)]
    pub config_schema: Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Overrides the registration priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Shared, mutable context handed to each plugin in a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub event: LifecycleEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageModel>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_model: Option<TypeModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    /// Configuration of the plugin currently executing
    #[serde(default)]
    pub config: PluginConfig,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub request_id: String,
    /// Unix timestamp in milliseconds; informational only
    pub timestamp: i64,
}

impl PluginContext {
    /// Fresh context for an event
    pub fn new(event: LifecycleEvent) -> Self {
        Self {
            event,
            package: None,
            type_model: None,
            route: None,
            validation: None,
            config: PluginConfig::new(),
            data: Map::new(),
            metadata: Map::new(),
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_package(mut self, package: PackageModel) -> Self {
        self.package = Some(package);
        self
    }

    pub fn with_route(mut self, route: RouteSpec) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Where a registered plugin came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginSource {
    /// Compiled in and registered through the built-in factory registry
    Builtin,
    /// Registered directly by the host program
    Registered,
    /// Loaded from a descriptor directory
    Discovered { dir: std::path::PathBuf },
}

/// Registry view of one plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub enabled: bool,
    pub priority: i32,
    /// Registration sequence number, ascending
    pub order: usize,
    pub events: Vec<LifecycleEvent>,
    pub source: PluginSource,
    pub config: PluginConfig,
}
