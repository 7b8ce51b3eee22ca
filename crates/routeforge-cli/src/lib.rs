//! RouteForge command-line interface
//!
//! Thin layer over `routeforge-engine`: argument parsing, configuration
//! loading, subscriber setup and terminal output.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

use std::path::Path;

use routeforge_config::{ConfigManager, ForgeConfig};
use tracing::debug;

pub use error::{CliError, CliResult};
pub use router::{Cli, CommandRouter, Commands, PluginsSubcommand};

/// Load layered configuration, reading `path` instead of the default file
pub fn load_config(path: Option<&Path>) -> CliResult<ForgeConfig> {
    let manager = match path {
        Some(path) => {
            if !path.is_file() {
                return Err(CliError::InvalidArgument {
                    message: format!("config file {} does not exist", path.display()),
                });
            }
            ConfigManager::with_path(path.to_path_buf())
        }
        None => ConfigManager::new(),
    };
    Ok(manager.load()?)
}

/// Load configuration and run the parsed command
pub fn run(cli: &Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(cli.verbose, &config.logging.level);
    debug!(
        targets = config.target.frameworks.len(),
        output_dir = %config.generator.output_dir.display(),
        "Configuration loaded"
    );
    CommandRouter::execute(&cli.command, &config)
}
