//! Middleware validators over a request context
//!
//! The context is a JSON object. Recognised keys: `method`, `path`,
//! `headers` (string or string-array values, names matched ignoring case),
//! `query` (object), `body` (string), `requests_in_window` (integer) and
//! `requires_auth` (bool). Missing keys never fail a check on their own.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{config_usize, Validator};
use crate::types::{codes, RuleConfig, RuleKind, Verdict};

static SQL_INJECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\bunion\b.+\bselect\b|\bor\b\s+\d+\s*=\s*\d+|'\s*or\s*'|;\s*(drop|delete|insert|update)\b|--\s*$|/\*)",
    )
    .expect("valid sql injection pattern")
});
static XSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(<\s*script|javascript:|\bon[a-z]+\s*=|<\s*iframe)").expect("valid xss pattern")
});

/// First value of a header, name matched ignoring ASCII case
fn header<'a>(context: &'a Value, name: &str) -> Option<&'a str> {
    let headers = context.get("headers")?.as_object()?;
    let (_, value) = headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name))?;
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(values) => values.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Request inputs an injection check should look at
fn inspected_inputs(context: &Value) -> Vec<&str> {
    let mut inputs = Vec::new();
    if let Some(path) = context.get("path").and_then(Value::as_str) {
        inputs.push(path);
    }
    if let Some(query) = context.get("query").and_then(Value::as_object) {
        for value in query.values() {
            match value {
                Value::String(s) => inputs.push(s.as_str()),
                Value::Array(items) => inputs.extend(items.iter().filter_map(Value::as_str)),
                _ => {}
            }
        }
    }
    if let Some(body) = context.get("body").and_then(Value::as_str) {
        inputs.push(body);
    }
    inputs
}

/// Rejects when `requests_in_window` exceeds `requests_per_minute + burst_size`
pub struct RateLimitValidator;

impl Validator for RateLimitValidator {
    fn name(&self) -> &str {
        "rate_limit_check"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Middleware
    }

    fn validate(&self, context: &Value, config: &RuleConfig) -> Verdict {
        let Some(seen) = context.get("requests_in_window").and_then(Value::as_u64) else {
            return Verdict::ok();
        };
        let limit = config_usize(config, "requests_per_minute").unwrap_or(60)
            + config_usize(config, "burst_size").unwrap_or(0);
        if seen > limit as u64 {
            Verdict::fail(
                codes::RATE_LIMIT_EXCEEDED,
                format!("{} requests exceed the limit of {}", seen, limit),
            )
        } else {
            Verdict::ok()
        }
    }
}

/// The `Origin` header must appear in `allowed_origins` (default `["*"]`)
pub struct CorsValidator;

impl Validator for CorsValidator {
    fn name(&self) -> &str {
        "cors_validation"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Middleware
    }

    fn validate(&self, context: &Value, config: &RuleConfig) -> Verdict {
        let Some(origin) = header(context, "Origin") else {
            return Verdict::ok();
        };
        let allowed = match config.get("allowed_origins").and_then(Value::as_array) {
            Some(list) => list.iter().filter_map(Value::as_str).collect::<Vec<_>>(),
            None => vec!["*"],
        };
        if allowed.iter().any(|a| *a == "*" || *a == origin) {
            Verdict::ok()
        } else {
            Verdict::fail(
                codes::CORS_ORIGIN_DENIED,
                format!("Origin {} is not allowed", origin),
            )
        }
    }
}

/// Bearer token shape check for routes with `requires_auth`
///
/// Only the three-segment JWT shape is verified; signatures are the
/// generated server's concern.
pub struct JwtTokenValidator;

impl Validator for JwtTokenValidator {
    fn name(&self) -> &str {
        "jwt_token_validation"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Middleware
    }

    fn validate(&self, context: &Value, _config: &RuleConfig) -> Verdict {
        let requires_auth = context
            .get("requires_auth")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !requires_auth {
            return Verdict::ok();
        }
        let Some(authorization) = header(context, "Authorization") else {
            return Verdict::fail(codes::MISSING_TOKEN, "Authorization header required");
        };
        let token = authorization
            .strip_prefix("Bearer ")
            .map(str::trim)
            .unwrap_or_default();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() == 3 && segments.iter().all(|s| !s.is_empty()) {
            Verdict::ok()
        } else {
            Verdict::fail(codes::INVALID_TOKEN, "Malformed bearer token")
        }
    }
}

pub struct SqlInjectionValidator;

impl Validator for SqlInjectionValidator {
    fn name(&self) -> &str {
        "sql_injection_check"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Middleware
    }

    fn validate(&self, context: &Value, _config: &RuleConfig) -> Verdict {
        if inspected_inputs(context)
            .iter()
            .any(|input| SQL_INJECTION.is_match(input))
        {
            Verdict::fail(codes::SQL_INJECTION, "Potential SQL injection detected")
        } else {
            Verdict::ok()
        }
    }
}

pub struct XssValidator;

impl Validator for XssValidator {
    fn name(&self) -> &str {
        "xss_prevention"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Middleware
    }

    fn validate(&self, context: &Value, _config: &RuleConfig) -> Verdict {
        if inspected_inputs(context).iter().any(|input| XSS.is_match(input)) {
            Verdict::fail(codes::XSS_DETECTED, "Potential cross-site scripting detected")
        } else {
            Verdict::ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rate_limit_includes_burst() {
        let config = json!({"requests_per_minute": 60, "burst_size": 10});
        let config = config.as_object().cloned().unwrap_or_default();
        let ok = json!({"requests_in_window": 70});
        let over = json!({"requests_in_window": 71});
        assert!(RateLimitValidator.validate(&ok, &config).is_valid());
        assert!(!RateLimitValidator.validate(&over, &config).is_valid());
        assert!(RateLimitValidator.validate(&json!({}), &config).is_valid());
    }

    #[test]
    fn test_cors_origin_list() {
        let config = json!({"allowed_origins": ["https://app.example.com"]});
        let config = config.as_object().cloned().unwrap_or_default();
        let allowed = json!({"headers": {"origin": ["https://app.example.com"]}});
        let denied = json!({"headers": {"Origin": "https://evil.example.com"}});
        assert!(CorsValidator.validate(&allowed, &config).is_valid());
        let verdict = CorsValidator.validate(&denied, &config);
        assert_eq!(verdict.errors[0].0, codes::CORS_ORIGIN_DENIED);
        assert!(CorsValidator.validate(&denied, &RuleConfig::new()).is_valid());
    }

    #[test]
    fn test_jwt_shape() {
        let empty = RuleConfig::new();
        assert!(JwtTokenValidator.validate(&json!({}), &empty).is_valid());

        let missing = json!({"requires_auth": true, "headers": {}});
        assert_eq!(
            JwtTokenValidator.validate(&missing, &empty).errors[0].0,
            codes::MISSING_TOKEN
        );

        let malformed = json!({"requires_auth": true, "headers": {"Authorization": "Bearer abc"}});
        assert_eq!(
            JwtTokenValidator.validate(&malformed, &empty).errors[0].0,
            codes::INVALID_TOKEN
        );

        let good = json!({"requires_auth": true, "headers": {"Authorization": "Bearer a.b.c"}});
        assert!(JwtTokenValidator.validate(&good, &empty).is_valid());
    }

    #[test]
    fn test_injection_checks() {
        let empty = RuleConfig::new();
        let sql = json!({"path": "/users", "query": {"q": "1 OR 1=1"}});
        let xss = json!({"path": "/users", "body": "<script>alert(1)</script>"});
        let clean = json!({"path": "/users", "query": {"q": "alice"}});

        assert!(!SqlInjectionValidator.validate(&sql, &empty).is_valid());
        assert!(!XssValidator.validate(&xss, &empty).is_valid());
        assert!(SqlInjectionValidator.validate(&clean, &empty).is_valid());
        assert!(XssValidator.validate(&clean, &empty).is_valid());
    }
}
