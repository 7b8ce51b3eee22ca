//! # routeforge engine
//!
//! Owns the per-run context and drives the full pipeline: scan a Go source
//! tree, synthesize routes, fire plugin lifecycle events and emit one
//! project per target framework.
//!
//! ```ignore
//! use routeforge_config::ForgeConfig;
//! use routeforge_engine::{ForgeContext, Pipeline};
//!
//! let ctx = ForgeContext::new(ForgeConfig::default())?;
//! let report = Pipeline::new(&ctx).dry_run(true).run(Path::new("./service"))?;
//! println!("{}", routeforge_engine::summary(&report.model, &report.routes));
//! ```

pub mod analysis;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod report;

pub use analysis::{analysis_json, summary, AnalysisSummary, ANALYSIS_FILE};
pub use context::ForgeContext;
pub use error::{EngineError, Result};
pub use pipeline::Pipeline;
pub use report::{GenerationReport, PluginFailure, RunReport, TargetReport};
