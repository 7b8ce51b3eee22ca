#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # routeforge patterns
//!
//! Convention-based mapping from Go method names to REST route shapes.
//!
//! ## Features
//!
//! - **Ordered rule table**: first match in table order wins, never resorted
//! - **Name patterns**: `Prefix*` and `Prefix*Infix*`, prefix compared ignoring case
//! - **Naive resources**: `{resource}` is the lower-cased type name plus `s`
//! - **Fallback shape**: unmatched methods map to `POST /{type}/{method}` as `custom`

pub mod error;
pub mod mapper;
pub mod models;
pub mod rules;

pub use error::{PatternError, PatternResult};
pub use mapper::{field_after_by, resource_name, PatternMapper};
pub use models::{HttpMethod, NamePattern, PatternRule, RouteShape};
pub use rules::{default_rules, CUSTOM_OPERATION};
