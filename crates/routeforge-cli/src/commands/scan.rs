// Scan a source tree and summarize it

use std::path::PathBuf;

use routeforge_config::ForgeConfig;
use routeforge_engine::{analysis_json, summary, ForgeContext, Pipeline};

use super::{warn_plugin_failures, Command};
use crate::error::CliResult;
use crate::output;

/// `routeforge scan <dir>`
pub struct ScanCommand {
    pub root: PathBuf,
    pub json: bool,
}

impl ScanCommand {
    pub fn new(root: PathBuf, json: bool) -> Self {
        Self { root, json }
    }
}

impl Command for ScanCommand {
    fn execute(&self, config: &ForgeConfig) -> CliResult<()> {
        let ctx = ForgeContext::new(config.clone())?;
        let mut pipeline = Pipeline::new(&ctx);
        let outcome = pipeline.scan(&self.root)?;
        let routes = pipeline.synthesize(&outcome.model)?;

        if self.json {
            println!("{}", analysis_json(&outcome.model, &routes)?);
        } else {
            print!("{}", summary(&outcome.model, &routes));
            println!(
                "{} of {} files parsed",
                outcome.report.units_parsed, outcome.report.units_matched
            );
        }

        for skipped in &outcome.report.skipped {
            output::print_warning(&format!(
                "skipped {}: {}",
                skipped.path.display(),
                skipped.reason
            ));
        }
        warn_plugin_failures(pipeline.plugin_failures());
        ctx.shutdown()?;
        Ok(())
    }
}
