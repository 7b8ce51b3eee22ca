//! # routeforge routes
//!
//! Turns a scanned [`routeforge_scanner::ProjectModel`] into the authoritative
//! list of [`RouteSpec`]s consumed by every target emitter.
//!
//! Route order is fixed: packages by key, types in declaration order and per
//! type annotation routes, inferred routes, then CRUD routes. Function-level
//! endpoints follow each package's types.

pub mod error;
pub mod inference;
pub mod route;
pub mod synthesizer;

pub use error::{Result, RouteError};
pub use inference::{non_trivial_parameters, parameters_for, responses_for};
pub use route::{AuthRequirement, RouteSource, RouteSpec};
pub use synthesizer::{crud_routes, RouteSynthesizer};
