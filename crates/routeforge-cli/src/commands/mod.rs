// Command handlers for the routeforge CLI

pub mod generate;
pub mod plugins;
pub mod routes;
pub mod scan;
pub mod validate;

pub use generate::GenerateCommand;
pub use plugins::{PluginsAction, PluginsCommand};
pub use routes::RoutesCommand;
pub use scan::ScanCommand;
pub use validate::ValidateCommand;

use routeforge_config::ForgeConfig;
use routeforge_engine::PluginFailure;

use crate::error::CliResult;
use crate::output;

/// Trait for command handlers
pub trait Command {
    /// Execute the command against a loaded configuration
    fn execute(&self, config: &ForgeConfig) -> CliResult<()>;
}

pub(crate) fn warn_plugin_failures(failures: &[PluginFailure]) {
    for failure in failures {
        output::print_warning(&format!(
            "plugin '{}' failed on {}: {}",
            failure.plugin, failure.event, failure.message
        ));
    }
}
