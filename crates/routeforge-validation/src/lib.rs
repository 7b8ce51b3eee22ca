//! # routeforge validation
//!
//! Registry of named validators and rules, independent of scan results.
//!
//! ## Features
//!
//! - **Field validators**: required, string/length, numeric/range, regex, enum,
//!   email, URL, phone, UUID, date, password strength, business identifiers,
//!   geo coordinates
//! - **Middleware validators**: rate limit, CORS origin, bearer token shape,
//!   SQL injection and XSS heuristics over a request context
//! - **Rules**: priorities, enable/disable, YAML rule files, named profiles
//! - **Snippets**: per-framework Go snippets rendered from templates
//!
//! Problems with a value or a rule's configuration never surface as `Err`;
//! they come back as issues inside a [`ValidationResult`].

pub mod engine;
pub mod error;
pub mod rules;
pub mod snippets;
pub mod types;
pub mod validators;

pub use engine::ValidationEngine;
pub use error::{Result, ValidationError};
pub use rules::{default_rules, profile_rules, RuleFile, PROFILES};
pub use snippets::{placeholder, SnippetRenderer};
pub use types::{
    codes, RuleConfig, RuleKind, ValidationIssue, ValidationResult, ValidationRule, Verdict,
};
pub use validators::{builtin_validators, Validator};
