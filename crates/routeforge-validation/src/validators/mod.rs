//! Validator trait and built-in validators

mod field;
mod middleware;

use regex::Regex;
use serde_json::Value;

pub use field::{
    BusinessIdentifierValidator, DateValidator, EmailValidator, EnumValidator,
    GeoLocationValidator, LengthValidator, NumericValidator, PasswordValidator, PhoneValidator,
    RangeValidator, RegexValidator, RequiredValidator, StringValidator, UrlValidator,
    UuidValidator,
};
pub use middleware::{
    CorsValidator, JwtTokenValidator, RateLimitValidator, SqlInjectionValidator, XssValidator,
};

use crate::types::{RuleConfig, RuleKind, Verdict};

/// A named check over a JSON value
///
/// Field validators receive the value under test; middleware validators
/// receive a request context object with `method`, `path`, `headers` and
/// whatever else the caller supplies.
pub trait Validator: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Rule class this validator serves
    fn kind(&self) -> RuleKind {
        RuleKind::Field
    }

    /// Check `value` against `config`
    fn validate(&self, value: &Value, config: &RuleConfig) -> Verdict;

    /// Like [`Validator::validate`], reusing the rule's compiled `pattern`
    fn validate_with_pattern(
        &self,
        value: &Value,
        config: &RuleConfig,
        _compiled: Option<&Regex>,
    ) -> Verdict {
        self.validate(value, config)
    }
}

/// Every built-in validator
pub fn builtin_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(RequiredValidator),
        Box::new(StringValidator),
        Box::new(NumericValidator),
        Box::new(EmailValidator),
        Box::new(UrlValidator),
        Box::new(RegexValidator),
        Box::new(LengthValidator),
        Box::new(RangeValidator),
        Box::new(EnumValidator),
        Box::new(DateValidator),
        Box::new(UuidValidator),
        Box::new(PhoneValidator),
        Box::new(PasswordValidator),
        Box::new(BusinessIdentifierValidator),
        Box::new(GeoLocationValidator),
        Box::new(RateLimitValidator),
        Box::new(CorsValidator),
        Box::new(JwtTokenValidator),
        Box::new(SqlInjectionValidator),
        Box::new(XssValidator),
    ]
}

pub(crate) fn config_f64(config: &RuleConfig, key: &str) -> Option<f64> {
    config.get(key).and_then(Value::as_f64)
}

pub(crate) fn config_usize(config: &RuleConfig, key: &str) -> Option<usize> {
    config
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

pub(crate) fn config_bool(config: &RuleConfig, key: &str) -> bool {
    config.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn config_str<'a>(config: &'a RuleConfig, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}
