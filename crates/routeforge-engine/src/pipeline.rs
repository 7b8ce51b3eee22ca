//! Generation pipeline
//!
//! One run fires lifecycle events around each stage:
//!
//! ```text
//! before_scan -> scan -> after_scan (per package) -> synthesize
//!   -> route_generated (per route) -> before_generation
//!   -> emit targets (parallel) -> write -> after_generation
//! ```
//!
//! Plugin dispatch is always sequential. Only target emission fans out.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use routeforge_config::TargetKind;
use routeforge_emitters::{
    emitter_for, EmitInput, GeneratedProject, OutputWriter, OutputWriterConfig,
};
use routeforge_plugins::{LifecycleEvent, PluginContext};
use routeforge_routes::{RouteSpec, RouteSynthesizer};
use routeforge_scanner::{ProjectModel, ScanOutcome, SourceScanner};
use routeforge_validation::ValidationResult;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::analysis::{analysis_json, ANALYSIS_FILE};
use crate::context::ForgeContext;
use crate::error::Result;
use crate::report::{FailureLog, GenerationReport, PluginFailure, RunReport, TargetReport};

/// Drives one run against a [`ForgeContext`]
pub struct Pipeline<'a> {
    ctx: &'a ForgeContext,
    targets: Vec<TargetKind>,
    output_dir: PathBuf,
    dry_run: bool,
    failures: FailureLog,
}

impl<'a> Pipeline<'a> {
    /// Pipeline using the configured targets and output directory
    pub fn new(ctx: &'a ForgeContext) -> Self {
        Self {
            targets: ctx.config().target.frameworks.clone(),
            output_dir: ctx.config().generator.output_dir.clone(),
            dry_run: false,
            failures: FailureLog::default(),
            ctx,
        }
    }

    /// Restrict the run to these targets; an empty list keeps the configured ones
    pub fn with_targets(mut self, targets: Vec<TargetKind>) -> Self {
        if !targets.is_empty() {
            self.targets = targets;
        }
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Scan, synthesize, emit and write
    pub fn run(mut self, root: &Path) -> Result<RunReport> {
        info!(root = %root.display(), dry_run = self.dry_run, "Run started");

        let outcome = self.scan(root)?;
        let routes = self.synthesize(&outcome.model)?;
        let generation = self.generate(&outcome.model, &routes)?;

        let analysis_path = if self.dry_run {
            None
        } else {
            let path = self.output_dir.join(ANALYSIS_FILE);
            fs::create_dir_all(&self.output_dir)?;
            fs::write(&path, analysis_json(&outcome.model, &routes)?)?;
            Some(path)
        };

        let report = RunReport {
            root: root.to_path_buf(),
            output_dir: self.output_dir,
            dry_run: self.dry_run,
            model: outcome.model,
            scan: outcome.report,
            routes,
            generation,
            plugin_failures: self.failures.into_inner(),
            analysis_path,
        };
        info!(
            route_count = report.routes.len(),
            targets_ok = report.generation.succeeded().count(),
            targets_failed = report.generation.failed().count(),
            plugin_failures = report.plugin_failures.len(),
            "Run completed"
        );
        Ok(report)
    }

    /// Scan `root`, firing `before_scan` and one `after_scan` per package
    pub fn scan(&mut self, root: &Path) -> Result<ScanOutcome> {
        let root_text = root.display().to_string();
        let mut before = PluginContext::new(LifecycleEvent::BeforeScan)
            .with_metadata("root", root_text.as_str());
        self.fire(LifecycleEvent::BeforeScan, &mut before)?;

        let scanner = SourceScanner::new(&self.ctx.config().generator)?;
        let outcome = scanner.scan(root)?;

        for package in outcome.model.packages() {
            let mut ctx = PluginContext::new(LifecycleEvent::AfterScan)
                .with_package(package.clone())
                .with_metadata("root", root_text.as_str())
                .with_metadata("package", package.key.as_str())
                .with_metadata("package_count", outcome.model.packages.len());
            self.fire(LifecycleEvent::AfterScan, &mut ctx)?;
        }
        Ok(outcome)
    }

    /// Build the route list, firing `route_generated` per route
    ///
    /// Data that plugins write for a route is copied into the route's
    /// metadata under keys it does not already have.
    pub fn synthesize(&mut self, model: &ProjectModel) -> Result<Vec<RouteSpec>> {
        let ctx = self.ctx;
        let config = ctx.config();
        let mut routes = RouteSynthesizer::new(ctx.mapper(), &config.generator)
            .strict(config.validation.strict_mode)
            .synthesize(model)?;

        let total = routes.len();
        for (index, route) in routes.iter_mut().enumerate() {
            let mut event = PluginContext::new(LifecycleEvent::RouteGenerated)
                .with_route(route.clone())
                .with_metadata("index", index)
                .with_metadata("route_count", total);
            self.fire(LifecycleEvent::RouteGenerated, &mut event)?;
            for (key, value) in event.data {
                route.metadata.entry(key).or_insert(value);
            }
        }
        Ok(routes)
    }

    /// Emit every target in parallel, then write them in target order
    ///
    /// A target that fails to emit or write is recorded in the report; the
    /// other targets are unaffected.
    pub fn generate(
        &mut self,
        model: &ProjectModel,
        routes: &[RouteSpec],
    ) -> Result<GenerationReport> {
        let ctx = self.ctx;
        let config = ctx.config();
        let targets = self.targets.clone();
        let names: Vec<Value> = targets.iter().map(|t| json!(t.as_str())).collect();
        let mut before = PluginContext::new(LifecycleEvent::BeforeGeneration)
            .with_metadata("route_count", routes.len())
            .with_metadata("targets", Value::Array(names))
            .with_metadata("dry_run", self.dry_run);
        self.fire(LifecycleEvent::BeforeGeneration, &mut before)?;

        let input = EmitInput {
            routes,
            project: model,
            generator: &config.generator,
            target: &config.target,
        };
        let emitted: Vec<(TargetKind, std::result::Result<GeneratedProject, String>)> = targets
            .par_iter()
            .map(|kind| {
                let project = emitter_for(*kind)
                    .and_then(|emitter| emitter.emit(&input))
                    .map_err(|e| e.to_string());
                (*kind, project)
            })
            .collect();

        let writer = OutputWriter::with_config(OutputWriterConfig {
            dry_run: self.dry_run,
        });
        let mut report = GenerationReport::default();
        for (kind, project) in emitted {
            let outcome = project.and_then(|project| {
                writer
                    .write(&project, &self.output_dir)
                    .map(|write| (project.triples, write))
                    .map_err(|e| e.to_string())
            });
            report.targets.push(match outcome {
                Ok((triples, write)) => TargetReport {
                    target: kind,
                    triples,
                    write: Some(write),
                    error: None,
                },
                Err(message) => {
                    error!(target_name = %kind, error = %message, "Target generation failed");
                    TargetReport {
                        target: kind,
                        triples: Vec::new(),
                        write: None,
                        error: Some(message),
                    }
                }
            });
        }

        let ok: Vec<Value> = report.succeeded().map(|t| json!(t.target.as_str())).collect();
        let failed: Vec<Value> = report.failed().map(|t| json!(t.target.as_str())).collect();
        let mut after = PluginContext::new(LifecycleEvent::AfterGeneration)
            .with_metadata("route_count", routes.len())
            .with_metadata("succeeded", Value::Array(ok))
            .with_metadata("failed", Value::Array(failed))
            .with_metadata("file_count", report.file_count())
            .with_metadata("output_dir", self.output_dir.display().to_string())
            .with_metadata("dry_run", self.dry_run);
        self.fire(LifecycleEvent::AfterGeneration, &mut after)?;

        Ok(report)
    }

    /// Validate one value, firing `validation_error` when it fails
    pub fn validate(
        &mut self,
        field: &str,
        value: &Value,
        rules: &[&str],
    ) -> Result<ValidationResult> {
        let result = self.ctx.validation().validate_field(field, value, rules);
        if !result.valid {
            let mut ctx = PluginContext::new(LifecycleEvent::ValidationError)
                .with_validation(result.clone())
                .with_metadata("field", field);
            self.fire(LifecycleEvent::ValidationError, &mut ctx)?;
        }
        Ok(result)
    }

    fn fire(&mut self, event: LifecycleEvent, ctx: &mut PluginContext) -> Result<()> {
        let report = self.ctx.plugins().dispatch(event, ctx)?;
        self.failures.record(report);
        Ok(())
    }

    /// Sandboxed plugin failures recorded so far
    pub fn plugin_failures(&self) -> &[PluginFailure] {
        self.failures.as_slice()
    }
}
