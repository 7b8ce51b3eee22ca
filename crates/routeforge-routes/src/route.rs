//! Route specification types

use std::collections::BTreeMap;
use std::fmt;

use routeforge_patterns::HttpMethod;
use routeforge_scanner::ParameterModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a route came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// `@api.route` or `@api.endpoint`
    Annotation,
    /// Method-name pattern inference
    SmartMapping,
    /// Fixed five-route CRUD set
    Crud,
}

impl RouteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteSource::Annotation => "annotation",
            RouteSource::SmartMapping => "smart_mapping",
            RouteSource::Crud => "crud",
        }
    }
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication requirement of a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequirement {
    pub required: bool,
    /// Raw `auth` value from the annotation, e.g. `jwt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl AuthRequirement {
    /// Requirement derived from an `auth=` annotation value
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Self {
                required: v == "required" || v == "jwt",
                scheme: Some(v.to_string()),
            },
            None => Self::default(),
        }
    }
}

/// One synthesized API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub method: HttpMethod,
    /// Path relative to the API prefix, placeholders written `{name}`
    pub path: String,
    /// Go package name the route is bound to
    pub package: String,
    /// Owning type, absent for free-function endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Bound function or method name; empty for struct-level routes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    /// Go identifier of the generated handler, unique within one route list
    pub handler_name: String,
    /// Operation tag such as `get`, `bulk_create` or `custom`
    pub operation: String,
    pub source: RouteSource,
    #[serde(default)]
    pub parameters: Vec<ParameterModel>,
    #[serde(default)]
    pub responses: Vec<ParameterModel>,
    #[serde(default)]
    pub auth: AuthRequirement,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl RouteSpec {
    /// Value of the `auto_generated` metadata flag
    pub fn auto_generated(&self) -> bool {
        self.metadata
            .get("auto_generated")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `(verb, path, operation)` triple used for cross-target comparison
    pub fn triple(&self) -> (HttpMethod, String, String) {
        (self.method, self.path.clone(), self.operation.clone())
    }

    /// Names of `{placeholder}` segments in path order
    pub fn path_params(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter_map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map(str::to_string)
            })
            .collect()
    }

    /// Whether a parameter with this literal name is inferred
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}
