//! Rule, issue and result types

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form rule configuration
pub type RuleConfig = Map<String, Value>;

/// Error codes carried by [`ValidationIssue::code`]
pub mod codes {
    pub const REQUIRED_MISSING: &str = "REQUIRED_MISSING";
    pub const INVALID_TYPE: &str = "INVALID_TYPE";
    pub const MIN_LENGTH: &str = "MIN_LENGTH";
    pub const MAX_LENGTH: &str = "MAX_LENGTH";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const MIN_VALUE: &str = "MIN_VALUE";
    pub const MAX_VALUE: &str = "MAX_VALUE";
    pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const INVALID_PATTERN: &str = "INVALID_PATTERN";
    pub const PATTERN_MISMATCH: &str = "PATTERN_MISMATCH";
    pub const INVALID_ENUM: &str = "INVALID_ENUM";
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const INVALID_UUID: &str = "INVALID_UUID";
    pub const INVALID_PHONE: &str = "INVALID_PHONE";
    pub const PASSWORD_TOO_SHORT: &str = "PASSWORD_TOO_SHORT";
    pub const PASSWORD_MISSING_UPPER: &str = "PASSWORD_MISSING_UPPER";
    pub const PASSWORD_MISSING_LOWER: &str = "PASSWORD_MISSING_LOWER";
    pub const PASSWORD_MISSING_NUMBER: &str = "PASSWORD_MISSING_NUMBER";
    pub const PASSWORD_MISSING_SYMBOL: &str = "PASSWORD_MISSING_SYMBOL";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_COORDINATES: &str = "INVALID_COORDINATES";
    pub const INVALID_LATITUDE: &str = "INVALID_LATITUDE";
    pub const INVALID_LONGITUDE: &str = "INVALID_LONGITUDE";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const CORS_ORIGIN_DENIED: &str = "CORS_ORIGIN_DENIED";
    pub const MISSING_TOKEN: &str = "MISSING_TOKEN";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const SQL_INJECTION: &str = "SQL_INJECTION";
    pub const XSS_DETECTED: &str = "XSS_DETECTED";
    pub const UNKNOWN_RULE: &str = "UNKNOWN_RULE";
    pub const UNKNOWN_VALIDATOR: &str = "UNKNOWN_VALIDATOR";
}

/// What a rule validates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// A single value
    #[default]
    Field,
    /// A request context map
    Middleware,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Field => write!(f, "field"),
            RuleKind::Middleware => write!(f, "middleware"),
        }
    }
}

/// A named, configured use of a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub config: RuleConfig,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Validator to run; the rule name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    #[serde(skip)]
    compiled: Option<CompiledPattern>,
}

fn default_enabled() -> bool {
    true
}

/// `config["pattern"]` compiled when the rule is registered or reconfigured
#[derive(Debug, Clone)]
struct CompiledPattern(Regex);

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl ValidationRule {
    /// Create an enabled field rule
    pub fn field(name: impl Into<String>, message: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            kind: RuleKind::Field,
            message: message.into(),
            config: RuleConfig::new(),
            priority,
            required: false,
            enabled: true,
            validator: None,
            compiled: None,
        }
    }

    /// Create an enabled middleware rule
    pub fn middleware(name: impl Into<String>, message: impl Into<String>, priority: i32) -> Self {
        Self {
            kind: RuleKind::Middleware,
            ..Self::field(name, message, priority)
        }
    }

    /// Set a configuration entry
    pub fn with_config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    /// Run a differently named validator
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Validator this rule dispatches to
    pub fn validator_name(&self) -> &str {
        self.validator.as_deref().unwrap_or(&self.name)
    }

    pub fn is_middleware(&self) -> bool {
        self.kind == RuleKind::Middleware
    }

    /// The configured `pattern`, if any
    pub fn pattern(&self) -> Option<&str> {
        self.config.get("pattern").and_then(Value::as_str)
    }

    /// Compile the configured `pattern` for reuse across validations
    ///
    /// An invalid pattern is returned as the regex error and leaves nothing
    /// cached, so validation reports it as `INVALID_PATTERN`.
    pub(crate) fn compile_pattern(&mut self) -> std::result::Result<(), regex::Error> {
        self.compiled = None;
        if let Some(pattern) = self.pattern() {
            self.compiled = Some(CompiledPattern(Regex::new(pattern)?));
        }
        Ok(())
    }

    /// The compiled pattern, while it still matches the configured one
    pub(crate) fn compiled_pattern(&self) -> Option<&Regex> {
        let pattern = self.pattern()?;
        self.compiled
            .as_ref()
            .map(|c| &c.0)
            .filter(|re| re.as_str() == pattern)
    }
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub rule: String,
    pub value: String,
    pub message: String,
    pub code: String,
}

/// Outcome of a single validator call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    /// `(code, message)` pairs; empty means valid
    pub errors: Vec<(String, String)>,
}

impl Verdict {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn fail(code: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![(code.to_string(), message.into())],
        }
    }

    pub fn push(&mut self, code: &str, message: impl Into<String>) {
        self.errors.push((code.to_string(), message.into()));
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Aggregated outcome of a field or middleware validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub fields: Map<String, Value>,
    pub applied_rules: Vec<String>,
    pub context: Map<String, Value>,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields: Map::new(),
            applied_rules: Vec::new(),
            context: Map::new(),
        }
    }

    /// Codes of every issue in order
    pub fn codes(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.code.as_str()).collect()
    }

    /// Check whether an issue with `code` was reported
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// Render a value the way issues record it
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
