//! # routeforge scanner
//!
//! Walks a Go source tree, parses each unit with tree-sitter and extracts the
//! declarations route synthesis works from.
//!
//! ## Features
//!
//! - **Glob filtering**: include/exclude patterns, excluded directories are pruned
//! - **Per-unit isolation**: a unit that fails to parse is logged and skipped
//! - **Parallel parsing**: units are parsed concurrently, merged in walk order
//! - **Package merge**: declarations from one directory form one [`PackageModel`]
//! - **Annotations**: `@api.*` directives in doc comments become [`AnnotationModel`]s

pub mod annotations;
pub mod error;
pub mod go;
pub mod merge;
pub mod model;
pub mod scanner;

pub use error::{Result, ScanError};
pub use go::{GoUnitParser, UnitModel};
pub use model::{
    AnnotationModel, FieldModel, InterfaceModel, MethodModel, PackageModel, ParameterModel,
    ProjectModel, TagModel, TypeModel,
};
pub use merge::MergeNote;
pub use scanner::{ScanOutcome, ScanReport, SkippedUnit, SourceScanner};
