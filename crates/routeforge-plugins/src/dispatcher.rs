//! Event dispatch
//!
//! Plugins for one event run strictly one after another in execution order:
//! priority descending, then registration order ascending. Each plugin gets
//! a copy of the context carrying its own configuration; after it succeeds,
//! the keys it wrote into `data` and `metadata` are merged back before the
//! next plugin runs.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{PluginError, Result};
use crate::manager::PluginManager;
use crate::types::{LifecycleEvent, PluginContext};

/// What happened during one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub event: LifecycleEvent,
    /// Plugins that completed, in execution order
    pub executed: Vec<String>,
    /// Sandboxed failures as `(plugin, message)`
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    fn new(event: LifecycleEvent) -> Self {
        Self {
            event,
            executed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl PluginManager {
    /// Run every enabled plugin subscribed to `event`
    ///
    /// Outside sandbox mode the first plugin error aborts the dispatch and is
    /// returned as [`PluginError::Execution`]. The registry lock is not held
    /// while plugins run.
    pub fn dispatch(&self, event: LifecycleEvent, ctx: &mut PluginContext) -> Result<DispatchReport> {
        ctx.event = event;
        let scheduled = self.schedule(Some(event))?;
        let mut report = DispatchReport::new(event);

        if scheduled.is_empty() {
            debug!(event = %event, "No plugins registered for event");
            return Ok(report);
        }
        debug!(event = %event, plugin_count = scheduled.len(), "Dispatching event");

        for entry in scheduled {
            let mut plugin_ctx = ctx.clone();
            plugin_ctx.config = entry.config;

            match entry.plugin.execute(&mut plugin_ctx) {
                Ok(()) => {
                    ctx.data.extend(plugin_ctx.data);
                    ctx.metadata.extend(plugin_ctx.metadata);
                    debug!(plugin = %entry.name, event = %event, "Plugin executed");
                    report.executed.push(entry.name);
                }
                Err(e) => {
                    let message = match e {
                        PluginError::Execution { message, .. } => message,
                        other => other.to_string(),
                    };
                    if self.sandbox_mode() {
                        warn!(plugin = %entry.name, event = %event, error = %message, "Plugin failed; continuing in sandbox mode");
                        report.failed.push((entry.name, message));
                        continue;
                    }
                    error!(plugin = %entry.name, event = %event, error = %message, "Plugin failed");
                    return Err(PluginError::execution(entry.name, event, message));
                }
            }
        }

        Ok(report)
    }
}
