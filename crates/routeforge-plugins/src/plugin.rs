//! The plugin contract

use serde_json::{json, Value};

use crate::error::{PluginError, Result};
use crate::types::{LifecycleEvent, PluginConfig, PluginContext, PluginDependency};

/// Frameworks a plugin supports unless it says otherwise
pub const ALL_FRAMEWORKS: [&str; 4] = ["gin", "echo", "chi", "fiber"];

/// A participant in the lifecycle pipeline
///
/// Plugins are shared between the registry and dispatch, so every method
/// takes `&self`; plugins with state keep it behind their own lock.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }

    /// Called once before the first dispatch with the stored configuration
    fn initialize(&self, _config: &PluginConfig) -> Result<()> {
        Ok(())
    }

    /// Handle one event; keys written to `ctx.data` are visible to later plugins
    fn execute(&self, ctx: &mut PluginContext) -> Result<()>;

    fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    fn supported_frameworks(&self) -> Vec<String> {
        ALL_FRAMEWORKS.iter().map(|f| f.to_string()).collect()
    }

    fn supported_events(&self) -> Vec<LifecycleEvent>;

    fn dependencies(&self) -> Vec<PluginDependency> {
        Vec::new()
    }

    /// JSON-schema-shaped description of accepted configuration
    fn config_schema(&self) -> Value {
        json!({ "type": "object" })
    }

    /// Check configuration before it is stored
    fn validate_config(&self, config: &PluginConfig) -> Result<()> {
        check_against_schema(&self.config_schema(), config).map_err(|message| {
            PluginError::InvalidConfig {
                plugin: self.name().to_string(),
                message,
            }
        })
    }
}

/// Check `required` keys and primitive `properties` types of an object schema
///
/// Keys the schema does not mention are accepted.
pub fn check_against_schema(schema: &Value, config: &PluginConfig) -> std::result::Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !config.contains_key(key) {
                return Err(format!("missing required key '{}'", key));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in config {
        let Some(expected) = properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let matches = match expected {
            "boolean" => value.is_boolean(),
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !matches {
            return Err(format!("'{}' must be of type {}", key, expected));
        }
    }
    Ok(())
}
