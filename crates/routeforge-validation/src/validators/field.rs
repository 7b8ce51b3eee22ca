//! Field validators

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{config_bool, config_f64, config_str, config_usize, Validator};
use crate::types::{codes, RuleConfig, Verdict};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});
static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid uuid pattern")
});
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-\(\)]{10,}$").expect("valid phone pattern"));
static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("valid symbol pattern"));

fn not_a_string() -> Verdict {
    Verdict::fail(codes::INVALID_TYPE, "Must be a string")
}

/// Rejects null and the empty string
pub struct RequiredValidator;

impl Validator for RequiredValidator {
    fn name(&self) -> &str {
        "required"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        match value {
            Value::Null => Verdict::fail(codes::REQUIRED_MISSING, "Field is required"),
            Value::String(s) if s.is_empty() => {
                Verdict::fail(codes::REQUIRED_MISSING, "Field is required")
            }
            _ => Verdict::ok(),
        }
    }
}

/// String type with optional `min_length`/`max_length` in characters
pub struct StringValidator;

impl Validator for StringValidator {
    fn name(&self) -> &str {
        "string"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        let len = s.chars().count();
        let mut verdict = Verdict::ok();
        if let Some(min) = config_usize(config, "min_length") {
            if len < min {
                verdict.push(
                    codes::MIN_LENGTH,
                    format!("Must be at least {} characters", min),
                );
            }
        }
        if let Some(max) = config_usize(config, "max_length") {
            if len > max {
                verdict.push(
                    codes::MAX_LENGTH,
                    format!("Must be at most {} characters", max),
                );
            }
        }
        verdict
    }
}

/// Same checks as `string`, registered under its own name
pub struct LengthValidator;

impl Validator for LengthValidator {
    fn name(&self) -> &str {
        "length"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        StringValidator.validate(value, config)
    }
}

/// Number, or a string that parses as one, with optional `min`/`max`
pub struct NumericValidator;

impl Validator for NumericValidator {
    fn name(&self) -> &str {
        "numeric"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => return Verdict::fail(codes::INVALID_NUMBER, "Must be a valid number"),
            },
            _ => None,
        };
        let Some(number) = number else {
            return Verdict::fail(codes::INVALID_TYPE, "Must be numeric");
        };

        let mut verdict = Verdict::ok();
        if let Some(min) = config_f64(config, "min") {
            if number < min {
                verdict.push(codes::MIN_VALUE, format!("Must be at least {}", min));
            }
        }
        if let Some(max) = config_f64(config, "max") {
            if number > max {
                verdict.push(codes::MAX_VALUE, format!("Must be at most {}", max));
            }
        }
        verdict
    }
}

/// Same checks as `numeric`, registered under its own name
pub struct RangeValidator;

impl Validator for RangeValidator {
    fn name(&self) -> &str {
        "range"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        NumericValidator.validate(value, config)
    }
}

pub struct EmailValidator;

impl Validator for EmailValidator {
    fn name(&self) -> &str {
        "email"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        match value.as_str() {
            Some(s) if EMAIL.is_match(s) => Verdict::ok(),
            Some(_) => Verdict::fail(codes::INVALID_EMAIL, "Must be a valid email address"),
            None => not_a_string(),
        }
    }
}

/// `http://` or `https://` followed by a host
pub struct UrlValidator;

impl Validator for UrlValidator {
    fn name(&self) -> &str {
        "url"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        let rest = s
            .strip_prefix("http://")
            .or_else(|| s.strip_prefix("https://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Verdict::ok(),
            _ => Verdict::fail(codes::INVALID_URL, "Must be a valid URL"),
        }
    }
}

/// Matches the configured `pattern`
pub struct RegexValidator;

impl Validator for RegexValidator {
    fn name(&self) -> &str {
        "regex"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        self.validate_with_pattern(value, config, None)
    }

    fn validate_with_pattern(
        &self,
        value: &Value,
        config: &RuleConfig,
        compiled: Option<&Regex>,
    ) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        let Some(pattern) = config_str(config, "pattern") else {
            return Verdict::fail(codes::INVALID_CONFIG, "Pattern configuration required");
        };
        match_pattern(s, pattern, compiled, "Does not match required pattern")
    }
}

/// Match against the rule's compiled pattern, compiling `pattern` when
/// there is none
fn match_pattern(s: &str, pattern: &str, compiled: Option<&Regex>, mismatch: &str) -> Verdict {
    let re = match compiled {
        Some(re) => Cow::Borrowed(re),
        None => match Regex::new(pattern) {
            Ok(re) => Cow::Owned(re),
            Err(_) => return Verdict::fail(codes::INVALID_PATTERN, "Invalid regex pattern"),
        },
    };
    if re.is_match(s) {
        Verdict::ok()
    } else {
        Verdict::fail(codes::PATTERN_MISMATCH, mismatch)
    }
}

/// Value is one of the configured `values`
pub struct EnumValidator;

impl Validator for EnumValidator {
    fn name(&self) -> &str {
        "enum"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        let Some(allowed) = config.get("values").and_then(Value::as_array) else {
            return Verdict::fail(codes::INVALID_CONFIG, "Values configuration required");
        };
        if allowed.contains(value) {
            Verdict::ok()
        } else {
            Verdict::fail(codes::INVALID_ENUM, "Value not in allowed list")
        }
    }
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp
pub struct DateValidator;

impl Validator for DateValidator {
    fn name(&self) -> &str {
        "date"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            || DateTime::parse_from_rfc3339(s).is_ok();
        if parsed {
            Verdict::ok()
        } else {
            Verdict::fail(codes::INVALID_DATE, "Must be a valid date")
        }
    }
}

pub struct UuidValidator;

impl Validator for UuidValidator {
    fn name(&self) -> &str {
        "uuid"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        match value.as_str() {
            Some(s) if UUID.is_match(s) => Verdict::ok(),
            Some(_) => Verdict::fail(codes::INVALID_UUID, "Must be a valid UUID"),
            None => not_a_string(),
        }
    }
}

pub struct PhoneValidator;

impl Validator for PhoneValidator {
    fn name(&self) -> &str {
        "phone"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        match value.as_str() {
            Some(s) if PHONE.is_match(s) => Verdict::ok(),
            Some(_) => Verdict::fail(codes::INVALID_PHONE, "Must be a valid phone number"),
            None => not_a_string(),
        }
    }
}

/// Minimum length plus opt-in character classes
///
/// Config keys: `min_length`, `require_upper`, `require_lower`,
/// `require_number`, `require_symbol`. Every failed requirement is
/// reported.
pub struct PasswordValidator;

impl Validator for PasswordValidator {
    fn name(&self) -> &str {
        "password_strength"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        let Some(password) = value.as_str() else {
            return not_a_string();
        };
        let mut verdict = Verdict::ok();

        if let Some(min) = config_usize(config, "min_length") {
            if password.chars().count() < min {
                verdict.push(
                    codes::PASSWORD_TOO_SHORT,
                    format!("Password must be at least {} characters", min),
                );
            }
        }
        if config_bool(config, "require_upper") && !password.chars().any(char::is_uppercase) {
            verdict.push(
                codes::PASSWORD_MISSING_UPPER,
                "Password must contain an uppercase letter",
            );
        }
        if config_bool(config, "require_lower") && !password.chars().any(char::is_lowercase) {
            verdict.push(
                codes::PASSWORD_MISSING_LOWER,
                "Password must contain a lowercase letter",
            );
        }
        if config_bool(config, "require_number") && !password.chars().any(|c| c.is_ascii_digit())
        {
            verdict.push(codes::PASSWORD_MISSING_NUMBER, "Password must contain a number");
        }
        if config_bool(config, "require_symbol") && !SYMBOL.is_match(password) {
            verdict.push(codes::PASSWORD_MISSING_SYMBOL, "Password must contain a symbol");
        }
        verdict
    }
}

/// Business identifier such as an API key; checked against `pattern` when set
pub struct BusinessIdentifierValidator;

impl Validator for BusinessIdentifierValidator {
    fn name(&self) -> &str {
        "api_key_format"
    }

    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict {
        self.validate_with_pattern(value, config, None)
    }

    fn validate_with_pattern(
        &self,
        value: &Value,
        config: &RuleConfig,
        compiled: Option<&Regex>,
    ) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        match config_str(config, "pattern") {
            Some(pattern) => match_pattern(s, pattern, compiled, "Does not match required format"),
            None if s.trim().is_empty() => {
                Verdict::fail(codes::INVALID_FORMAT, "Identifier must not be blank")
            }
            None => Verdict::ok(),
        }
    }
}

/// `"lat,lon"` with latitude in [-90, 90] and longitude in [-180, 180]
pub struct GeoLocationValidator;

impl Validator for GeoLocationValidator {
    fn name(&self) -> &str {
        "geo_location"
    }

    fn validate(&self, value: &Value, _config: &RuleConfig) -> Verdict {
        let Some(s) = value.as_str() else {
            return not_a_string();
        };
        let parts: Vec<&str> = s.split(',').collect();
        let [lat, lon] = parts.as_slice() else {
            return Verdict::fail(
                codes::INVALID_COORDINATES,
                "Must be in format 'latitude,longitude'",
            );
        };

        let mut verdict = Verdict::ok();
        if !in_range(lat, 90.0) {
            verdict.push(codes::INVALID_LATITUDE, "Invalid latitude value");
        }
        if !in_range(lon, 180.0) {
            verdict.push(codes::INVALID_LONGITUDE, "Invalid longitude value");
        }
        verdict
    }
}

fn in_range(raw: &str, bound: f64) -> bool {
    raw.trim()
        .parse::<f64>()
        .map(|v| (-bound..=bound).contains(&v))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> RuleConfig {
        value.as_object().cloned().unwrap_or_default()
    }

    fn codes_of(verdict: &Verdict) -> Vec<&str> {
        verdict.errors.iter().map(|(c, _)| c.as_str()).collect()
    }

    #[test]
    fn test_required() {
        let empty = RuleConfig::new();
        assert!(!RequiredValidator.validate(&Value::Null, &empty).is_valid());
        assert!(!RequiredValidator.validate(&json!(""), &empty).is_valid());
        assert!(RequiredValidator.validate(&json!(0), &empty).is_valid());
    }

    #[test]
    fn test_email() {
        let empty = RuleConfig::new();
        assert!(EmailValidator.validate(&json!("a@b.co"), &empty).is_valid());
        let verdict = EmailValidator.validate(&json!("not-an-email"), &empty);
        assert_eq!(codes_of(&verdict), vec![codes::INVALID_EMAIL]);
        assert_eq!(
            codes_of(&EmailValidator.validate(&json!(5), &empty)),
            vec![codes::INVALID_TYPE]
        );
    }

    #[test]
    fn test_password_strength() {
        let cfg = config(json!({
            "min_length": 8,
            "require_upper": true,
            "require_lower": true,
            "require_number": true,
            "require_symbol": true,
        }));
        let weak = PasswordValidator.validate(&json!("abc"), &cfg);
        assert_eq!(
            codes_of(&weak),
            vec![
                codes::PASSWORD_TOO_SHORT,
                codes::PASSWORD_MISSING_UPPER,
                codes::PASSWORD_MISSING_NUMBER,
                codes::PASSWORD_MISSING_SYMBOL,
            ]
        );
        assert!(PasswordValidator.validate(&json!("Abcdef1!"), &cfg).is_valid());
    }

    #[test]
    fn test_numeric_bounds_and_strings() {
        let cfg = config(json!({"min": 1, "max": 100}));
        assert!(NumericValidator.validate(&json!("42"), &cfg).is_valid());
        assert_eq!(
            codes_of(&NumericValidator.validate(&json!(101), &cfg)),
            vec![codes::MAX_VALUE]
        );
        assert_eq!(
            codes_of(&RangeValidator.validate(&json!(0), &cfg)),
            vec![codes::MIN_VALUE]
        );
        assert_eq!(
            codes_of(&NumericValidator.validate(&json!("forty"), &cfg)),
            vec![codes::INVALID_NUMBER]
        );
        assert_eq!(
            codes_of(&NumericValidator.validate(&json!(true), &cfg)),
            vec![codes::INVALID_TYPE]
        );
    }

    #[test]
    fn test_string_length_counts_characters() {
        let cfg = config(json!({"min_length": 2, "max_length": 3}));
        assert!(StringValidator.validate(&json!("äöü"), &cfg).is_valid());
        assert_eq!(
            codes_of(&LengthValidator.validate(&json!("a"), &cfg)),
            vec![codes::MIN_LENGTH]
        );
        assert_eq!(
            codes_of(&StringValidator.validate(&json!("abcd"), &cfg)),
            vec![codes::MAX_LENGTH]
        );
    }

    #[test]
    fn test_regex_and_config_errors() {
        let empty = RuleConfig::new();
        assert_eq!(
            codes_of(&RegexValidator.validate(&json!("x"), &empty)),
            vec![codes::INVALID_CONFIG]
        );
        let bad = config(json!({"pattern": "("}));
        assert_eq!(
            codes_of(&RegexValidator.validate(&json!("x"), &bad)),
            vec![codes::INVALID_PATTERN]
        );
        let digits = config(json!({"pattern": "^[0-9]+$"}));
        assert!(RegexValidator.validate(&json!("123"), &digits).is_valid());
        assert_eq!(
            codes_of(&RegexValidator.validate(&json!("12a"), &digits)),
            vec![codes::PATTERN_MISMATCH]
        );
    }

    #[test]
    fn test_enum() {
        let cfg = config(json!({"values": ["red", "green"]}));
        assert!(EnumValidator.validate(&json!("red"), &cfg).is_valid());
        assert_eq!(
            codes_of(&EnumValidator.validate(&json!("blue"), &cfg)),
            vec![codes::INVALID_ENUM]
        );
        assert_eq!(
            codes_of(&EnumValidator.validate(&json!("red"), &RuleConfig::new())),
            vec![codes::INVALID_CONFIG]
        );
    }

    #[test]
    fn test_formats() {
        let empty = RuleConfig::new();
        assert!(UrlValidator.validate(&json!("https://example.com"), &empty).is_valid());
        assert!(!UrlValidator.validate(&json!("ftp://example.com"), &empty).is_valid());
        assert!(UuidValidator
            .validate(&json!("123e4567-e89b-12d3-a456-426614174000"), &empty)
            .is_valid());
        assert!(!UuidValidator.validate(&json!("123e4567"), &empty).is_valid());
        assert!(PhoneValidator.validate(&json!("+1 (555) 123-4567"), &empty).is_valid());
        assert!(!PhoneValidator.validate(&json!("12345"), &empty).is_valid());
        assert!(DateValidator.validate(&json!("2024-02-29"), &empty).is_valid());
        assert!(DateValidator.validate(&json!("2024-02-29T10:00:00Z"), &empty).is_valid());
        assert_eq!(
            codes_of(&DateValidator.validate(&json!("2023-02-30"), &empty)),
            vec![codes::INVALID_DATE]
        );
    }

    #[test]
    fn test_compiled_pattern_is_used_when_given() {
        let cfg = config(json!({"pattern": "^[0-9]+$"}));
        let letters = Regex::new("^[a-z]+$").unwrap();
        assert!(RegexValidator
            .validate_with_pattern(&json!("abc"), &cfg, Some(&letters))
            .is_valid());
        assert_eq!(
            codes_of(&RegexValidator.validate_with_pattern(&json!("abc"), &cfg, None)),
            vec![codes::PATTERN_MISMATCH]
        );
    }

    #[test]
    fn test_fixed_patterns_compile() {
        for re in [&EMAIL, &UUID, &PHONE, &SYMBOL] {
            assert!(!Lazy::force(re).as_str().is_empty());
        }
    }

    #[test]
    fn test_api_key_format() {
        let cfg = config(json!({"pattern": "^[a-zA-Z0-9]{32,}$"}));
        let key = "a".repeat(32);
        assert!(BusinessIdentifierValidator.validate(&json!(key), &cfg).is_valid());
        assert_eq!(
            codes_of(&BusinessIdentifierValidator.validate(&json!("short"), &cfg)),
            vec![codes::PATTERN_MISMATCH]
        );
    }

    #[test]
    fn test_geo_location() {
        let empty = RuleConfig::new();
        assert!(GeoLocationValidator.validate(&json!("45.5, -122.6"), &empty).is_valid());
        assert_eq!(
            codes_of(&GeoLocationValidator.validate(&json!("91,181"), &empty)),
            vec![codes::INVALID_LATITUDE, codes::INVALID_LONGITUDE]
        );
        assert_eq!(
            codes_of(&GeoLocationValidator.validate(&json!("1,2,3"), &empty)),
            vec![codes::INVALID_COORDINATES]
        );
        assert_eq!(
            codes_of(&GeoLocationValidator.validate(&json!("north,0"), &empty)),
            vec![codes::INVALID_LATITUDE]
        );
    }
}
