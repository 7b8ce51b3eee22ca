//! Validation engine: rule registry, dispatch and snippet rendering

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use routeforge_config::ValidationSettings;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::rules::{default_rules, profile_rules, RuleFile, PROFILES};
use crate::snippets::SnippetRenderer;
use crate::types::{
    codes, display_value, RuleConfig, RuleKind, ValidationIssue, ValidationResult,
    ValidationRule, Verdict,
};
use crate::validators::{builtin_validators, Validator};

/// Owned registry of validators and rules
///
/// Built once per run from [`ValidationSettings`]. Rules change only through
/// explicit calls such as [`ValidationEngine::add_rule`] and
/// [`ValidationEngine::configure_rule`].
pub struct ValidationEngine {
    settings: ValidationSettings,
    validators: HashMap<String, Box<dyn Validator>>,
    rules: BTreeMap<String, ValidationRule>,
    snippets: SnippetRenderer,
}

impl ValidationEngine {
    /// Create an engine with every built-in validator registered
    ///
    /// Default rules are added when `default_rules` is set, then rules from
    /// `custom_rules_path` when present.
    pub fn new(settings: &ValidationSettings) -> Result<Self> {
        let mut engine = Self {
            settings: settings.clone(),
            validators: HashMap::new(),
            rules: BTreeMap::new(),
            snippets: SnippetRenderer::new()?,
        };

        for validator in builtin_validators() {
            engine.validators.insert(validator.name().to_string(), validator);
        }

        if settings.default_rules {
            for rule in default_rules() {
                engine.add_rule(rule)?;
            }
        }

        if let Some(path) = &settings.custom_rules_path {
            engine.load_rules_from_file(path)?;
        }

        info!(
            validator_count = engine.validators.len(),
            rule_count = engine.rules.len(),
            "Validation engine ready"
        );
        Ok(engine)
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Register a validator, replacing any with the same name
    pub fn register_validator<V: Validator + 'static>(&mut self, validator: V) {
        let name = validator.name().to_string();
        if self.validators.insert(name.clone(), Box::new(validator)).is_some() {
            debug!(validator = %name, "Replaced validator");
        }
    }

    /// Whether a validator with this name is registered
    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Add or replace a rule
    pub fn add_rule(&mut self, mut rule: ValidationRule) -> Result<()> {
        if rule.name.trim().is_empty() {
            return Err(ValidationError::InvalidRule {
                name: rule.name,
                message: "rule name must not be empty".to_string(),
            });
        }
        if let Err(e) = rule.compile_pattern() {
            warn!(rule = %rule.name, error = %e, "Rule pattern does not compile");
        }
        debug!(rule = %rule.name, kind = %rule.kind, priority = rule.priority, "Registered rule");
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Enable or disable a rule
    pub fn enable_rule(&mut self, name: &str, enabled: bool) -> Result<()> {
        let rule = self
            .rules
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownRule(name.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// Merge configuration entries into a rule
    pub fn configure_rule(&mut self, name: &str, config: RuleConfig) -> Result<()> {
        let rule = self
            .rules
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownRule(name.to_string()))?;
        rule.config.extend(config);
        if let Err(e) = rule.compile_pattern() {
            warn!(rule = %name, error = %e, "Rule pattern does not compile");
        }
        Ok(())
    }

    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.rules.get(name)
    }

    /// Every rule, highest priority first, ties by name
    pub fn rules(&self) -> Vec<&ValidationRule> {
        let mut rules: Vec<&ValidationRule> = self.rules.values().collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        rules
    }

    /// Read a YAML rule file and add every rule in it
    pub fn load_rules_from_file(&mut self, path: &Path) -> Result<usize> {
        let file = RuleFile::load(path)?;
        let count = file.rules.len();
        for rule in file.rules {
            self.add_rule(rule)?;
        }
        info!(path = %path.display(), rule_count = count, "Loaded validation rules");
        Ok(count)
    }

    /// Rule names of a named profile
    pub fn rules_for_profile(&self, profile: &str) -> Option<Vec<String>> {
        profile_rules(profile).map(|names| names.iter().map(|n| n.to_string()).collect())
    }

    /// Names of every profile
    pub fn profiles(&self) -> Vec<&'static str> {
        PROFILES.iter().map(|(name, _)| *name).collect()
    }

    /// Validate one value against the named rules, in the given order
    ///
    /// A name resolves to a registered rule first and otherwise to a bare
    /// validator with empty configuration. Unknown names are reported as
    /// `UNKNOWN_RULE` in strict mode and ignored otherwise.
    pub fn validate_field(&self, field: &str, value: &Value, rule_names: &[&str]) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.fields.insert(field.to_string(), value.clone());
        let shown = display_value(value);

        for name in rule_names {
            let (verdict, message) = match self.rules.get(*name) {
                Some(rule) if !rule.enabled => {
                    debug!(rule = %name, "Skipping disabled rule");
                    continue;
                }
                Some(rule) if rule.kind == RuleKind::Middleware => {
                    debug!(rule = %name, field, "Skipping middleware rule in field validation");
                    continue;
                }
                Some(rule) => (self.run_rule(rule, value), rule.message.as_str()),
                None => match self.validators.get(*name) {
                    Some(validator) => (validator.validate(value, &RuleConfig::new()), ""),
                    None if self.settings.strict_mode => (
                        Verdict::fail(codes::UNKNOWN_RULE, format!("Unknown rule: {}", name)),
                        "",
                    ),
                    None => {
                        debug!(rule = %name, "Ignoring unknown rule");
                        continue;
                    }
                },
            };

            result.applied_rules.push(name.to_string());
            if Self::record(&mut result, verdict, field, name, &shown, message)
                && self.settings.stop_on_first_error
            {
                break;
            }
        }

        result
    }

    /// Run every enabled middleware rule against a request context
    ///
    /// Rules run by priority descending, ties by name.
    pub fn validate_middleware(&self, context: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(map) = context.as_object() {
            result.context = map.clone();
        }

        for rule in self.rules() {
            if !rule.enabled || rule.kind != RuleKind::Middleware {
                continue;
            }
            let verdict = self.run_rule(rule, context);
            result.applied_rules.push(rule.name.clone());
            if Self::record(
                &mut result,
                verdict,
                "middleware",
                &rule.name,
                "context",
                &rule.message,
            ) && self.settings.stop_on_first_error
            {
                break;
            }
        }

        result
    }

    /// Build a middleware context from request parts
    pub fn request_context(method: &str, path: &str, headers: Map<String, Value>) -> Value {
        let mut context = Map::new();
        context.insert("method".to_string(), Value::String(method.to_string()));
        context.insert("path".to_string(), Value::String(path.to_string()));
        context.insert("headers".to_string(), Value::Object(headers));
        Value::Object(context)
    }

    /// Source snippet for a target framework, or a placeholder comment
    pub fn render_snippet(&self, target: &str, kind: &str) -> String {
        self.snippets.render(target, kind)
    }

    fn run_rule(&self, rule: &ValidationRule, value: &Value) -> Verdict {
        match self.validators.get(rule.validator_name()) {
            Some(validator) => {
                validator.validate_with_pattern(value, &rule.config, rule.compiled_pattern())
            }
            None => {
                warn!(rule = %rule.name, validator = rule.validator_name(), "Rule references unknown validator");
                Verdict::fail(
                    codes::UNKNOWN_VALIDATOR,
                    format!("Unknown validator: {}", rule.validator_name()),
                )
            }
        }
    }

    /// Append failures to the result; returns whether any were recorded
    fn record(
        result: &mut ValidationResult,
        verdict: Verdict,
        field: &str,
        rule: &str,
        value: &str,
        rule_message: &str,
    ) -> bool {
        if verdict.is_valid() {
            return false;
        }
        result.valid = false;
        for (code, message) in verdict.errors {
            let message = if rule_message.is_empty() || is_config_code(&code) {
                message
            } else {
                rule_message.to_string()
            };
            result.errors.push(ValidationIssue {
                field: field.to_string(),
                rule: rule.to_string(),
                value: value.to_string(),
                message,
                code,
            });
        }
        true
    }
}

fn is_config_code(code: &str) -> bool {
    matches!(
        code,
        codes::INVALID_CONFIG | codes::UNKNOWN_RULE | codes::UNKNOWN_VALIDATOR
    )
}
