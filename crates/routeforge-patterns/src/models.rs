//! Data models for the pattern table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PatternError, PatternResult};

/// HTTP verbs a route can be registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Upper-case verb as written on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(PatternError::UnknownMethod(s.to_string())),
        }
    }
}

/// A method-name pattern
///
/// `Get*` matches any name starting with `get` ignoring case. `Get*By*`
/// additionally needs a literal `By` after the prefix followed by at least one
/// character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    /// `Prefix*`
    Prefix {
        /// Prefix as written, compared ignoring case
        prefix: String,
    },
    /// `Prefix*Infix*`
    Split {
        /// Prefix as written, compared ignoring case
        prefix: String,
        /// Case-sensitive infix
        infix: String,
    },
}

impl NamePattern {
    /// Parse a pattern written as `Prefix*` or `Prefix*Infix*`
    pub fn parse(raw: &str) -> PatternResult<Self> {
        let body = raw
            .strip_suffix('*')
            .ok_or_else(|| PatternError::InvalidPattern(raw.to_string()))?;
        let parts: Vec<&str> = body.split('*').collect();
        match parts.as_slice() {
            [prefix] if !prefix.is_empty() => Ok(NamePattern::Prefix {
                prefix: prefix.to_string(),
            }),
            [prefix, infix] if !prefix.is_empty() && !infix.is_empty() => Ok(NamePattern::Split {
                prefix: prefix.to_string(),
                infix: infix.to_string(),
            }),
            _ => Err(PatternError::InvalidPattern(raw.to_string())),
        }
    }

    /// Check whether a method name satisfies this pattern
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Prefix { prefix } => starts_with_ignore_case(name, prefix),
            NamePattern::Split { prefix, infix } => {
                if !starts_with_ignore_case(name, prefix) {
                    return false;
                }
                let rest = &name[prefix.len()..];
                rest.find(infix.as_str())
                    .map(|idx| idx + infix.len() < rest.len())
                    .unwrap_or(false)
            }
        }
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Prefix { prefix } => write!(f, "{}*", prefix),
            NamePattern::Split { prefix, infix } => write!(f, "{}*{}*", prefix, infix),
        }
    }
}

/// One entry in the ordered rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    /// Name patterns; any one matching selects the rule
    pub patterns: Vec<NamePattern>,
    /// Verb of the produced route
    pub method: HttpMethod,
    /// Path template with `{resource}`, `{field}` and `{id}` placeholders
    pub path_template: String,
    /// Operation tag such as `get` or `bulk_create`
    pub operation: String,
    /// Whether a match is routed without an explicit annotation
    pub auto_generate: bool,
}

impl PatternRule {
    /// Build a rule from written patterns
    pub fn new(
        patterns: &[&str],
        method: HttpMethod,
        path_template: impl Into<String>,
        operation: impl Into<String>,
        auto_generate: bool,
    ) -> PatternResult<Self> {
        let operation = operation.into();
        if patterns.is_empty() {
            return Err(PatternError::EmptyRule(operation));
        }
        Ok(Self {
            patterns: patterns
                .iter()
                .map(|p| NamePattern::parse(p))
                .collect::<PatternResult<_>>()?,
            method,
            path_template: path_template.into(),
            operation,
            auto_generate,
        })
    }

    /// Check whether any of the rule's patterns matches
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    /// Patterns as written, e.g. `["Get*", "Find*"]`
    pub fn pattern_strings(&self) -> Vec<String> {
        self.patterns.iter().map(ToString::to_string).collect()
    }
}

/// Route shape proposed for one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteShape {
    /// HTTP verb
    pub method: HttpMethod,
    /// Concrete path with `{resource}` and `{field}` substituted
    pub path: String,
    /// Operation tag, `custom` when no rule matched
    pub operation: String,
    /// Whether the route is emitted without an annotation
    pub auto_generated: bool,
    /// Patterns of the matched rule; empty for the fallback shape
    pub method_patterns: Vec<String>,
}

impl RouteShape {
    /// Whether this shape came from a table rule
    pub fn is_matched(&self) -> bool {
        !self.method_patterns.is_empty()
    }
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}
