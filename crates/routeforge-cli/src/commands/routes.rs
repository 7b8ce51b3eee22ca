// List synthesized routes

use std::path::PathBuf;

use routeforge_config::ForgeConfig;
use routeforge_engine::{ForgeContext, Pipeline};

use super::{warn_plugin_failures, Command};
use crate::error::CliResult;
use crate::output::column;

/// `routeforge routes <dir>`
pub struct RoutesCommand {
    pub root: PathBuf,
    pub json: bool,
}

impl RoutesCommand {
    pub fn new(root: PathBuf, json: bool) -> Self {
        Self { root, json }
    }
}

impl Command for RoutesCommand {
    fn execute(&self, config: &ForgeConfig) -> CliResult<()> {
        let ctx = ForgeContext::new(config.clone())?;
        let mut pipeline = Pipeline::new(&ctx);
        let outcome = pipeline.scan(&self.root)?;
        let routes = pipeline.synthesize(&outcome.model)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&routes)?);
        } else if routes.is_empty() {
            println!("No routes found under {}", self.root.display());
        } else {
            let path_width = routes.iter().map(|r| r.path.len()).max().unwrap_or(0);
            for route in &routes {
                let access = if route.auth.required { " (auth)" } else { "" };
                println!(
                    "{} {} {}.{} [{}]{}",
                    column(route.method.as_str(), 7),
                    column(&route.path, path_width),
                    route.package,
                    route.handler_name,
                    route.source,
                    access
                );
            }
        }

        warn_plugin_failures(pipeline.plugin_failures());
        ctx.shutdown()?;
        Ok(())
    }
}
