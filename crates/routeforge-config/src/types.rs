//! Core configuration types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level routeforge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ForgeConfig {
    /// Scanning and synthesis options
    pub generator: GeneratorConfig,
    /// Output target options
    pub target: TargetConfig,
    /// Validation engine options
    pub validation: ValidationSettings,
    /// Plugin pipeline options
    pub plugins: PluginSettings,
    /// Logging options
    pub logging: LoggingConfig,
}

/// Options consumed by the scanner and the route synthesizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Globs a source unit must match to be scanned
    pub include_patterns: Vec<String>,
    /// Globs that exclude units or whole directories
    pub exclude_patterns: Vec<String>,
    /// Parse `@api.*` directives from doc comments
    pub scan_annotations: bool,
    /// Emit the fixed five-route CRUD set per type
    pub auto_crud: bool,
    /// Infer routes from method names
    pub smart_mapping: bool,
    /// Root directory for generated projects
    pub output_dir: PathBuf,
    /// Name of the generated project
    pub package_name: String,
    /// Go module path for generated projects; defaults to `package_name`
    pub module_path: Option<String>,
}

impl GeneratorConfig {
    /// Module path written into generated manifests
    pub fn effective_module_path(&self) -> String {
        self.module_path
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.package_name.clone())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["*.go".to_string()],
            exclude_patterns: vec![
                "*_test.go".to_string(),
                "vendor/*".to_string(),
                ".git/*".to_string(),
            ],
            scan_annotations: true,
            auto_crud: true,
            smart_mapping: true,
            output_dir: PathBuf::from("./generated-api"),
            package_name: "autogenerated-api".to_string(),
            module_path: None,
        }
    }
}

/// Supported output web frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Gin,
    Echo,
    Chi,
    Fiber,
}

impl TargetKind {
    /// Every supported target, in emission order
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Gin,
        TargetKind::Echo,
        TargetKind::Chi,
        TargetKind::Fiber,
    ];

    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Gin => "gin",
            TargetKind::Echo => "echo",
            TargetKind::Chi => "chi",
            TargetKind::Fiber => "fiber",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gin" => Ok(TargetKind::Gin),
            "echo" => Ok(TargetKind::Echo),
            "chi" => Ok(TargetKind::Chi),
            "fiber" => Ok(TargetKind::Fiber),
            other => Err(ConfigError::Validation(format!(
                "Unknown target framework: {}",
                other
            ))),
        }
    }
}

/// Options shared by every target emitter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// Frameworks to emit
    pub frameworks: Vec<TargetKind>,
    /// Middleware names installed globally, in order
    pub middleware: Vec<String>,
    /// Authentication settings
    pub auth: AuthSettings,
    /// CORS policy
    pub cors: CorsSettings,
    /// API documentation
    pub docs: DocsSettings,
    /// Smoke tests
    pub testing: TestingSettings,
    /// Container and orchestration descriptors
    pub deployment: DeploymentSettings,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            frameworks: TargetKind::ALL.to_vec(),
            middleware: vec![
                "request_id".to_string(),
                "logger".to_string(),
                "recovery".to_string(),
                "cors".to_string(),
                "security_headers".to_string(),
            ],
            auth: AuthSettings::default(),
            cors: CorsSettings::default(),
            docs: DocsSettings::default(),
            testing: TestingSettings::default(),
            deployment: DeploymentSettings::default(),
        }
    }
}

/// Authentication settings for generated projects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthSettings {
    pub enabled: bool,
    /// Only `jwt` is emitted today
    pub scheme: String,
    /// Environment variable holding the signing secret
    pub secret_env: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scheme: "jwt".to_string(),
            secret_env: "JWT_SECRET".to_string(),
        }
    }
}

/// CORS policy for generated projects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorsSettings {
    pub enabled: bool,
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    pub max_age: u32,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_headers: ["Origin", "Content-Type", "Accept", "Authorization", "X-Request-ID"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            expose_headers: vec!["X-Request-ID".to_string()],
            allow_credentials: false,
            max_age: 86400,
        }
    }
}

/// Generated API documentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocsSettings {
    pub enabled: bool,
    pub path: String,
    pub title: String,
    pub version: String,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/docs".to_string(),
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Generated smoke tests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestingSettings {
    pub enabled: bool,
}

impl Default for TestingSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Container and orchestration descriptors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeploymentSettings {
    pub docker: bool,
    pub kubernetes: bool,
    pub replicas: u32,
    pub port: u16,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            docker: true,
            kubernetes: false,
            replicas: 3,
            port: 8080,
        }
    }
}

/// Validation engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationSettings {
    /// Stop at the first failing rule instead of collecting every error
    pub stop_on_first_error: bool,
    /// Treat unknown rule names as failures
    pub strict_mode: bool,
    /// Register the built-in rule set
    pub default_rules: bool,
    /// Optional YAML file with additional rules
    pub custom_rules_path: Option<PathBuf>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            stop_on_first_error: false,
            strict_mode: false,
            default_rules: true,
            custom_rules_path: None,
        }
    }
}

/// Plugin pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PluginSettings {
    /// Directory scanned for plugin descriptors
    pub plugin_dir: Option<PathBuf>,
    /// Load descriptors from `plugin_dir` at startup
    pub auto_load: bool,
    /// When non-empty, only these plugins start enabled
    pub enabled_plugins: Vec<String>,
    /// Plugins that start disabled
    pub disabled_plugins: Vec<String>,
    /// Log plugin failures and continue instead of aborting
    pub sandbox_mode: bool,
    /// Upper bound on registered plugins
    pub max_plugins: usize,
    /// Per-plugin overrides keyed by plugin name
    pub plugins: BTreeMap<String, PluginOverride>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            auto_load: false,
            enabled_plugins: Vec::new(),
            disabled_plugins: Vec::new(),
            sandbox_mode: true,
            max_plugins: 50,
            plugins: BTreeMap::new(),
        }
    }
}

/// Per-plugin configuration override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PluginOverride {
    pub enabled: Option<bool>,
    pub priority: Option<i32>,
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
