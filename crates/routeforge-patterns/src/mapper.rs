//! Method name to route shape mapping

use tracing::trace;

use crate::{
    models::{HttpMethod, PatternRule, RouteShape},
    rules::{default_rules, CUSTOM_OPERATION},
};

/// Maps method names onto an ordered rule table; first match wins
#[derive(Debug, Clone)]
pub struct PatternMapper {
    rules: Vec<PatternRule>,
}

impl PatternMapper {
    /// Create a mapper over the built-in table
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create a mapper over a custom table, kept in the given order
    pub fn with_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Rules in match order
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First rule whose patterns match `method_name`
    pub fn find_rule(&self, method_name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.matches(method_name))
    }

    /// Map a method of `type_name` to a route shape
    pub fn map(&self, method_name: &str, type_name: &str) -> RouteShape {
        match self.find_rule(method_name) {
            Some(rule) => {
                trace!(method = method_name, operation = %rule.operation, "Pattern matched");
                RouteShape {
                    method: rule.method,
                    path: build_path(&rule.path_template, method_name, type_name),
                    operation: rule.operation.clone(),
                    auto_generated: rule.auto_generate,
                    method_patterns: rule.pattern_strings(),
                }
            }
            None => RouteShape {
                method: HttpMethod::Post,
                path: format!(
                    "/{}/{}",
                    type_name.to_lowercase(),
                    method_name.to_lowercase()
                ),
                operation: CUSTOM_OPERATION.to_string(),
                auto_generated: false,
                method_patterns: Vec::new(),
            },
        }
    }
}

impl Default for PatternMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Resource segment for a type: lower-cased name plus `s`
pub fn resource_name(type_name: &str) -> String {
    format!("{}s", type_name.to_lowercase())
}

/// Lower-cased text after the first literal `By`, if any follows it
pub fn field_after_by(method_name: &str) -> Option<String> {
    let idx = method_name.find("By")?;
    let rest = &method_name[idx + 2..];
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_lowercase())
    }
}

fn build_path(template: &str, method_name: &str, type_name: &str) -> String {
    let mut path = template.replace("{resource}", &resource_name(type_name));
    if path.contains("{field}") {
        if let Some(field) = field_after_by(method_name) {
            path = path.replace("{field}", &field);
        }
    }
    path
}
