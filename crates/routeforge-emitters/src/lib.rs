//! routeforge target emitters
//!
//! Renders the synthesized route list into a runnable Go project for each
//! supported web framework (gin, echo, chi, fiber). Emission is pure and
//! deterministic; [`OutputWriter`] is the only component that touches disk.
//!
//! Every target registers the same `(verb, path, operation)` triples. Only
//! the placeholder syntax and the framework idiom differ.

pub mod emitter;
pub mod error;
pub mod models;
pub mod targets;
pub mod templates;
mod view;
pub mod writer;

pub use emitter::{emit_project, EmitInput, Framework, PathStyle, TargetEmitter};
pub use error::{EmitError, Result};
pub use models::{GeneratedFile, GeneratedProject, RouteTriple};
pub use targets::{
    all_emitters, emitter_for, emitter_named, ChiEmitter, EchoEmitter, FiberEmitter, GinEmitter,
};
pub use templates::TemplateSet;
pub use writer::{FileWriteResult, OutputWriter, OutputWriterConfig, WriteAction, WriteResult};
