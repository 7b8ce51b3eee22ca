//! Default rules, profiles and rule files

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::types::ValidationRule;

/// Named groups of rules applied together
pub const PROFILES: &[(&str, &[&str])] = &[
    ("user_registration", &["required", "email", "password_strength"]),
    ("api_key_auth", &["required", "api_key_format"]),
    ("pagination", &["required", "numeric", "range"]),
];

/// Rule names of a profile, if it exists
pub fn profile_rules(profile: &str) -> Option<&'static [&'static str]> {
    PROFILES
        .iter()
        .find(|(name, _)| *name == profile)
        .map(|(_, rules)| *rules)
}

/// Rules registered when `default_rules` is enabled
pub fn default_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::field("required", "This field is required", 100).required(),
        ValidationRule::field("email", "Must be a valid email address", 90)
            .with_config("allow_display_name", true),
        ValidationRule::field(
            "password_strength",
            "Password must meet security requirements",
            95,
        )
        .with_config("min_length", 8)
        .with_config("require_upper", true)
        .with_config("require_lower", true)
        .with_config("require_number", true)
        .with_config("require_symbol", true),
        ValidationRule::field("api_key_format", "API key must follow required format", 85)
            .with_config("pattern", "^[a-zA-Z0-9]{32,}$"),
        ValidationRule::field(
            "pagination_limit",
            "Pagination limit exceeds maximum allowed",
            80,
        )
        .with_validator("numeric")
        .with_config("max", 100),
        ValidationRule::middleware("rate_limit_check", "Rate limit exceeded", 70)
            .with_config("requests_per_minute", 60)
            .with_config("burst_size", 10),
        ValidationRule::middleware("cors_validation", "CORS policy violation", 60)
            .with_config("allowed_origins", json!(["*"])),
        ValidationRule::middleware("jwt_token_validation", "Invalid or expired JWT token", 90),
        ValidationRule::middleware("sql_injection_check", "Potential SQL injection detected", 95),
        ValidationRule::middleware("xss_prevention", "Potential XSS attack detected", 90),
    ]
}

/// On-disk rule file
///
/// ```yaml
/// rules:
///   - name: sku
///     validator: regex
///     message: SKU must look like ABC-123
///     priority: 50
///     config:
///       pattern: "^[A-Z]{3}-[0-9]{3}$"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

impl RuleFile {
    /// Read and parse a YAML rule file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ValidationError::RuleFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RuleFile = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), rule_count = file.rules.len(), "Parsed rule file");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleKind;

    #[test]
    fn test_default_rule_priorities() {
        let rules = default_rules();
        let priority = |name: &str| rules.iter().find(|r| r.name == name).map(|r| r.priority);
        assert_eq!(priority("required"), Some(100));
        assert_eq!(priority("password_strength"), Some(95));
        assert_eq!(priority("pagination_limit"), Some(80));
        assert_eq!(priority("cors_validation"), Some(60));
        assert_eq!(
            rules.iter().filter(|r| r.kind == RuleKind::Middleware).count(),
            5
        );
    }

    #[test]
    fn test_profiles() {
        assert_eq!(
            profile_rules("user_registration"),
            Some(&["required", "email", "password_strength"][..])
        );
        assert!(profile_rules("checkout").is_none());
    }

    #[test]
    fn test_rule_file_yaml_defaults() {
        let yaml = "rules:\n  - name: sku\n    validator: regex\n    config:\n      pattern: '^[A-Z]+$'\n";
        let file: RuleFile = serde_yaml::from_str(yaml).unwrap();
        let rule = &file.rules[0];
        assert_eq!(rule.validator_name(), "regex");
        assert_eq!(rule.kind, RuleKind::Field);
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);
    }
}
