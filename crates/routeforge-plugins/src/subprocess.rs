//! Subprocess plugin protocol
//!
//! A discovered plugin is an executable invoked once per event. The
//! JSON-serialised [`PluginContext`] is written to its stdin; it must print a
//! single JSON object on stdout:
//!
//! ```json
//! { "data": { ... }, "metadata": { ... }, "error": null }
//! ```
//!
//! A non-null `error` or a non-zero exit status is an execution failure.
//! The child runs with the invoking user's privileges and sees only the
//! context it is handed; no filesystem isolation is applied.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::RwLock;
use std::thread;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{PluginError, Result};
use crate::plugin::{check_against_schema, Plugin, ALL_FRAMEWORKS};
use crate::types::{LifecycleEvent, PluginConfig, PluginContext, PluginDependency, PluginDescriptor};

/// What a plugin executable prints on stdout
#[derive(Debug, Default, Deserialize)]
struct PluginResponse {
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    error: Option<String>,
}

/// A plugin backed by an external executable
pub struct SubprocessPlugin {
    descriptor: PluginDescriptor,
    dir: PathBuf,
    config: RwLock<PluginConfig>,
}

impl SubprocessPlugin {
    /// Wrap a descriptor found in `dir`
    pub fn new(descriptor: PluginDescriptor, dir: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            dir: dir.into(),
            config: RwLock::new(PluginConfig::new()),
        }
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of the executable
    pub fn executable(&self) -> PathBuf {
        self.dir.join(&self.descriptor.main_file)
    }

    fn run(&self, ctx: &PluginContext) -> std::result::Result<PluginResponse, String> {
        let executable = self.executable();
        let input = serde_json::to_vec(ctx).map_err(|e| format!("Failed to serialise context: {}", e))?;

        let mut child = Command::new(&executable)
            .current_dir(&self.dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to start '{}': {}", executable.display(), e))?;

        // stdout is drained while the context is still being written
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(&input),
            None => Ok(()),
        });

        let output = child
            .wait_with_output()
            .map_err(|e| format!("Failed to wait for plugin: {}", e))?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(plugin = %self.descriptor.name, "Plugin closed stdin before reading the whole context");
            }
            Ok(Err(e)) => return Err(format!("Failed to write context: {}", e)),
            Err(_) => return Err("Context writer thread panicked".to_string()),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(PluginResponse::default());
        }
        serde_json::from_str(stdout.trim()).map_err(|e| format!("Invalid plugin response: {}", e))
    }
}

impl Plugin for SubprocessPlugin {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn version(&self) -> &str {
        &self.descriptor.version
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn author(&self) -> &str {
        &self.descriptor.author
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
        if ctx.config.is_empty() {
            let stored = self
                .config
                .read()
                .map_err(|e| PluginError::Registry(format!("Failed to acquire read lock: {}", e)))?;
            ctx.config = stored.clone();
        }

        let start = Instant::now();
        debug!(plugin = %self.descriptor.name, event = %ctx.event, executable = %self.executable().display(), "Running plugin executable");

        let response = self.run(ctx).map_err(|message| {
            error!(plugin = %self.descriptor.name, event = %ctx.event, error = %message, "Plugin executable failed");
            PluginError::execution(&self.descriptor.name, ctx.event, message)
        })?;

        if let Some(message) = response.error {
            return Err(PluginError::execution(&self.descriptor.name, ctx.event, message));
        }
        ctx.data.extend(response.data);
        ctx.metadata.extend(response.metadata);

        debug!(
            plugin = %self.descriptor.name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Plugin executable finished"
        );
        Ok(())
    }

    fn supported_frameworks(&self) -> Vec<String> {
        if self.descriptor.supported_frameworks.is_empty() {
            ALL_FRAMEWORKS.iter().map(|f| f.to_string()).collect()
        } else {
            self.descriptor.supported_frameworks.clone()
        }
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        self.descriptor.supported_events.clone()
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        self.descriptor.dependencies.clone()
    }

    fn config_schema(&self) -> Value {
        if self.descriptor.config_schema.is_null() {
            serde_json::json!({ "type": "object" })
        } else {
            self.descriptor.config_schema.clone()
        }
    }

    fn validate_config(&self, config: &PluginConfig) -> Result<()> {
        check_against_schema(&self.config_schema(), config).map_err(|message| {
            PluginError::InvalidConfig {
                plugin: self.descriptor.name.clone(),
                message,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, main_file: &str) -> PluginDescriptor {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "main_file": main_file,
            "supported_events": ["after_scan"],
            "config_schema": {"type": "object", "required": ["token"]},
        }))
        .unwrap()
    }

    #[test]
    fn test_descriptor_drives_metadata() {
        let plugin = SubprocessPlugin::new(descriptor("audit", "run.sh"), "/opt/plugins/audit");
        assert_eq!(plugin.name(), "audit");
        assert_eq!(plugin.version(), "0.1.0");
        assert_eq!(plugin.supported_events(), vec![LifecycleEvent::AfterScan]);
        assert_eq!(plugin.supported_frameworks().len(), 4);
        assert_eq!(plugin.executable(), PathBuf::from("/opt/plugins/audit/run.sh"));
    }

    #[test]
    fn test_schema_from_descriptor() {
        let plugin = SubprocessPlugin::new(descriptor("audit", "run.sh"), "/tmp");
        assert!(plugin.validate_config(&PluginConfig::new()).is_err());
        let mut config = PluginConfig::new();
        config.insert("token".to_string(), Value::String("x".to_string()));
        assert!(plugin.validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_executable_is_execution_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let plugin = SubprocessPlugin::new(descriptor("ghost", "absent.sh"), dir.path());
        let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
        assert!(matches!(
            plugin.execute(&mut ctx),
            Err(PluginError::Execution { .. })
        ));
    }
}
