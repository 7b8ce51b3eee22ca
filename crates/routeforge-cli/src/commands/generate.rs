// Generate target projects

use std::path::PathBuf;

use routeforge_config::{ForgeConfig, TargetKind};
use routeforge_engine::{ForgeContext, Pipeline, RunReport};

use super::{warn_plugin_failures, Command};
use crate::error::{CliError, CliResult};
use crate::output;

/// `routeforge generate <dir>`
pub struct GenerateCommand {
    pub root: PathBuf,
    /// Empty keeps the configured targets
    pub targets: Vec<TargetKind>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

impl Command for GenerateCommand {
    fn execute(&self, config: &ForgeConfig) -> CliResult<()> {
        let ctx = ForgeContext::new(config.clone())?;
        let mut pipeline = Pipeline::new(&ctx)
            .with_targets(self.targets.clone())
            .dry_run(self.dry_run);
        if let Some(output) = &self.output {
            pipeline = pipeline.with_output_dir(output.clone());
        }

        let report = pipeline.run(&self.root)?;
        print_report(&report);
        ctx.shutdown()?;

        let failed = report.generation.failed().count();
        if failed > 0 {
            return Err(CliError::GenerationFailed {
                failed,
                total: report.generation.targets.len(),
            });
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    println!(
        "{} routes from {} packages",
        report.routes.len(),
        report.model.packages.len()
    );

    for target in &report.generation.targets {
        match (&target.write, &target.error) {
            (Some(write), _) if write.dry_run => {
                println!(
                    "  {:<6} would write {} files to {}",
                    target.target,
                    write.files.len(),
                    write.root.display()
                );
            }
            (Some(write), _) => {
                println!(
                    "  {:<6} {} written, {} unchanged in {}",
                    target.target,
                    write.files_written,
                    write.files_unchanged,
                    write.root.display()
                );
            }
            (None, Some(error)) => {
                output::print_error(&format!("{}: {}", target.target, error));
            }
            (None, None) => {}
        }
    }

    if let Some(path) = &report.analysis_path {
        println!("  analysis {}", path.display());
    }
    warn_plugin_failures(&report.plugin_failures);

    if report.is_clean() {
        let verb = if report.dry_run { "Previewed" } else { "Generated" };
        output::print_success(&format!(
            "{} {} targets in {}",
            verb,
            report.generation.targets.len(),
            report.output_dir.display()
        ));
    }
}
