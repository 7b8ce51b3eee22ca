// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use routeforge_config::{ForgeConfig, TargetKind};
use routeforge_plugins::LifecycleEvent;

use crate::commands::*;
use crate::error::CliResult;

/// RouteForge - scaffold REST APIs from Go sources
#[derive(Parser, Debug)]
#[command(name = "routeforge")]
#[command(bin_name = "routeforge")]
#[command(about = "Scan Go sources and scaffold REST API projects")]
#[command(
    long_about = "RouteForge scans a Go source tree, derives REST routes from annotations, method names and CRUD conventions, and writes one runnable project per web framework (gin, echo, chi, fiber).\n\nQuick start:\n  routeforge scan ./src\n  routeforge routes ./src --json\n  routeforge generate ./src --target gin --output ./api"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ./routeforge.toml, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scan a source tree and print what was found
    Scan {
        /// Root of the Go source tree
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the routes a source tree produces
    Routes {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Print routes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate one project per target framework
    Generate {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Target framework; repeat for several (default: configured targets)
        #[arg(short, long = "target", value_name = "TARGET", value_parser = parse_target)]
        targets: Vec<TargetKind>,

        /// Output directory (default: generator.output_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Report what would be written without touching the disk
        #[arg(long)]
        dry_run: bool,
    },

    /// Check one value against validation rules
    Validate {
        /// Rule name; repeat for several
        #[arg(short, long = "rule", value_name = "NAME", required = true)]
        rules: Vec<String>,

        /// Value to check
        #[arg(long, value_name = "VALUE")]
        value: String,

        /// Field name used in messages
        #[arg(long, default_value = "value")]
        field: String,

        /// Parse the value as a JSON literal instead of a string
        #[arg(long)]
        json_value: bool,
    },

    /// Inspect and create plugins
    Plugins {
        #[command(subcommand)]
        action: PluginsSubcommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PluginsSubcommand {
    /// List registered plugins in registration order
    List {
        #[arg(long)]
        json: bool,
    },

    /// Create a plugin directory with a descriptor and script
    Scaffold {
        /// Plugin name
        #[arg(value_name = "NAME")]
        name: String,

        /// Parent directory (default: plugins.plugin_dir, else ./plugins)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Lifecycle event to subscribe to; repeat for several
        #[arg(long = "event", value_name = "EVENT", value_parser = parse_event)]
        events: Vec<LifecycleEvent>,
    },
}

fn parse_target(s: &str) -> Result<TargetKind, String> {
    s.parse().map_err(|e: routeforge_config::ConfigError| e.to_string())
}

fn parse_event(s: &str) -> Result<LifecycleEvent, String> {
    s.parse()
        .map_err(|e: routeforge_plugins::PluginError| e.to_string())
}

/// Route commands to their handlers
pub struct CommandRouter;

impl CommandRouter {
    pub fn execute(command: &Commands, config: &ForgeConfig) -> CliResult<()> {
        match command {
            Commands::Scan { dir, json } => ScanCommand::new(dir.clone(), *json).execute(config),
            Commands::Routes { dir, json } => {
                RoutesCommand::new(dir.clone(), *json).execute(config)
            }
            Commands::Generate {
                dir,
                targets,
                output,
                dry_run,
            } => GenerateCommand {
                root: dir.clone(),
                targets: targets.clone(),
                output: output.clone(),
                dry_run: *dry_run,
            }
            .execute(config),
            Commands::Validate {
                rules,
                value,
                field,
                json_value,
            } => ValidateCommand {
                rules: rules.clone(),
                value: value.clone(),
                field: field.clone(),
                json_value: *json_value,
            }
            .execute(config),
            Commands::Plugins { action } => {
                let action = match action {
                    PluginsSubcommand::List { json } => PluginsAction::List { json: *json },
                    PluginsSubcommand::Scaffold { name, dir, events } => PluginsAction::Scaffold {
                        name: name.clone(),
                        dir: dir.clone(),
                        events: events.clone(),
                    },
                };
                PluginsCommand::new(action).execute(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_parses_repeated_targets() {
        let cli = Cli::try_parse_from([
            "routeforge",
            "generate",
            "./src",
            "--target",
            "gin",
            "-t",
            "chi",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                targets, dry_run, ..
            } => {
                assert_eq!(targets, vec![TargetKind::Gin, TargetKind::Chi]);
                assert!(dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = Cli::try_parse_from(["routeforge", "generate", "./src", "--target", "rocket"])
            .unwrap_err();
        assert!(err.to_string().contains("rocket"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "routeforge",
            "routes",
            "./src",
            "--verbose",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_validate_requires_rule() {
        assert!(Cli::try_parse_from(["routeforge", "validate", "--value", "x"]).is_err());
    }

    #[test]
    fn test_scaffold_events() {
        let cli = Cli::try_parse_from([
            "routeforge",
            "plugins",
            "scaffold",
            "audit",
            "--event",
            "route_generated",
        ])
        .unwrap();
        match cli.command {
            Commands::Plugins {
                action: PluginsSubcommand::Scaffold { name, events, .. },
            } => {
                assert_eq!(name, "audit");
                assert_eq!(events, vec![LifecycleEvent::RouteGenerated]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
