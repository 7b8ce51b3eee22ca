//! Run and generation reports

use std::path::PathBuf;

use routeforge_config::TargetKind;
use routeforge_emitters::{RouteTriple, WriteResult};
use routeforge_plugins::{DispatchReport, LifecycleEvent};
use routeforge_routes::RouteSpec;
use routeforge_scanner::{ProjectModel, ScanReport};
use serde::Serialize;

/// A plugin failure tolerated in sandbox mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginFailure {
    pub event: LifecycleEvent,
    pub plugin: String,
    pub message: String,
}

/// Outcome of one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: TargetKind,
    /// Routes the target registers, in route order
    pub triples: Vec<RouteTriple>,
    /// Present when emission and writing succeeded
    pub write: Option<WriteResult>,
    /// Present when emission or writing failed
    pub error: Option<String>,
}

impl TargetReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of every configured target
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub targets: Vec<TargetReport>,
}

impl GenerationReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| t.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| !t.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.targets.iter().all(TargetReport::is_success)
    }

    pub fn target(&self, kind: TargetKind) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.target == kind)
    }

    /// Files written (or previewed) across all targets
    pub fn file_count(&self) -> usize {
        self.targets
            .iter()
            .filter_map(|t| t.write.as_ref())
            .map(|w| w.files.len())
            .sum()
    }
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub model: ProjectModel,
    pub scan: ScanReport,
    pub routes: Vec<RouteSpec>,
    pub generation: GenerationReport,
    pub plugin_failures: Vec<PluginFailure>,
    /// Where the analysis export was written, when it was
    pub analysis_path: Option<PathBuf>,
}

impl RunReport {
    /// Whether every target succeeded and no plugin failed
    pub fn is_clean(&self) -> bool {
        self.generation.is_success() && self.plugin_failures.is_empty()
    }
}

/// Collects sandboxed plugin failures across dispatches
#[derive(Debug, Default)]
pub(crate) struct FailureLog {
    failures: Vec<PluginFailure>,
}

impl FailureLog {
    pub(crate) fn record(&mut self, report: DispatchReport) {
        for (plugin, message) in report.failed {
            self.failures.push(PluginFailure {
                event: report.event,
                plugin,
                message,
            });
        }
    }

    pub(crate) fn as_slice(&self) -> &[PluginFailure] {
        &self.failures
    }

    pub(crate) fn into_inner(self) -> Vec<PluginFailure> {
        self.failures
    }
}
