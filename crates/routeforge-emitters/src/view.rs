//! Template contexts
//!
//! Every template renders from a single [`ProjectView`]. All fields are
//! always present because templates compile in strict mode.

use std::collections::{BTreeSet, HashSet};

use heck::{ToKebabCase, ToSnakeCase};
use routeforge_config::TargetKind;
use routeforge_patterns::HttpMethod;
use routeforge_routes::RouteSpec;
use routeforge_scanner::{FieldModel, ParameterModel, ProjectModel};
use serde::Serialize;

use crate::emitter::{EmitInput, Framework, PathStyle};
use crate::models::RouteTriple;

/// Query and path values every handler may extract, in extraction order
const HANDLER_PARAMS: [&str; 4] = ["id", "q", "limit", "offset"];

/// Fields every generated model already declares
const BASE_FIELDS: [&str; 3] = ["ID", "CreatedAt", "UpdatedAt"];

const GO_BUILTINS: [&str; 28] = [
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128", "error", "any", "map", "chan", "func", "interface", "struct", "time.Time",
    "time.Duration",
];

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    target: &'static str,
    target_title: &'static str,
    title: String,
    api_version: String,
    package_name: String,
    module_path: String,
    framework_module: &'static str,
    framework_version: &'static str,
    app_name: String,
    port: u16,
    replicas: u32,
    auth: AuthView,
    cors: CorsView,
    docs: DocsView,
    middleware: MiddlewareView,
    routes: Vec<RouteView>,
    public_routes: Vec<RouteView>,
    protected_routes: Vec<RouteView>,
    shadowed_routes: Vec<RouteView>,
    has_routes: bool,
    has_protected: bool,
    uses_strconv: bool,
    uses_path_params: bool,
    models: Vec<ModelView>,
}

#[derive(Debug, Clone, Serialize)]
struct AuthView {
    enabled: bool,
    scheme: String,
    secret_env: String,
}

#[derive(Debug, Clone, Serialize)]
struct CorsView {
    origins: String,
    methods: String,
    headers: String,
    expose: String,
    origins_csv: String,
    methods_csv: String,
    headers_csv: String,
    expose_csv: String,
    credentials: bool,
    max_age: u32,
}

#[derive(Debug, Clone, Serialize)]
struct DocsView {
    enabled: bool,
    path: String,
}

#[derive(Debug, Clone, Serialize)]
struct MiddlewareView {
    request_id: bool,
    logger: bool,
    recovery: bool,
    cors: bool,
    security_headers: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RouteView {
    method: &'static str,
    method_title: String,
    path: String,
    framework_path: String,
    sample_path: String,
    handler: String,
    message: String,
    operation: String,
    auth_required: bool,
    has_body: bool,
    has_id: bool,
    has_q: bool,
    has_limit: bool,
    has_offset: bool,
    params: Vec<&'static str>,
    parameters: Vec<ParamView>,
    responses: Vec<ParamView>,
    #[serde(skip)]
    verb: HttpMethod,
    #[serde(skip)]
    raw_framework_path: String,
}

#[derive(Debug, Clone, Serialize)]
struct ParamView {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug, Clone, Serialize)]
struct ModelView {
    name: String,
    lower: String,
    fields: Vec<ModelFieldView>,
}

#[derive(Debug, Clone, Serialize)]
struct ModelFieldView {
    name: String,
    go_type: String,
    json: String,
}

impl ProjectView {
    pub fn build(
        kind: TargetKind,
        framework: Framework,
        style: PathStyle,
        input: &EmitInput<'_>,
    ) -> Self {
        let target = input.target;
        let auth_enabled = target.auth.enabled;

        let routes: Vec<RouteView> = input
            .routes
            .iter()
            .map(|route| RouteView::build(route, style, auth_enabled))
            .collect();

        // The first registration of a (verb, path shape) wins; frameworks
        // reject or silently shadow the rest.
        let mut seen = HashSet::new();
        let mut public_routes = Vec::new();
        let mut protected_routes = Vec::new();
        let mut shadowed_routes = Vec::new();
        for (view, route) in routes.iter().zip(input.routes) {
            if !seen.insert((route.method, path_shape(&route.path))) {
                shadowed_routes.push(view.clone());
            } else if view.auth_required {
                protected_routes.push(view.clone());
            } else {
                public_routes.push(view.clone());
            }
        }

        let uses_middleware = |name: &str| target.middleware.iter().any(|m| m == name);
        let package_name = input.generator.package_name.clone();

        Self {
            target: kind.as_str(),
            target_title: framework.name,
            title: target.docs.title.clone(),
            api_version: target.docs.version.clone(),
            module_path: format!("{}/{}", input.generator.effective_module_path(), kind),
            framework_module: framework.module,
            framework_version: framework.version,
            app_name: format!("{}-{}", package_name.to_kebab_case(), kind),
            package_name,
            port: target.deployment.port,
            replicas: target.deployment.replicas,
            auth: AuthView {
                enabled: auth_enabled,
                scheme: target.auth.scheme.clone(),
                secret_env: target.auth.secret_env.clone(),
            },
            cors: CorsView {
                origins: go_string_slice(&target.cors.allow_origins),
                methods: go_string_slice(&target.cors.allow_methods),
                headers: go_string_slice(&target.cors.allow_headers),
                expose: go_string_slice(&target.cors.expose_headers),
                origins_csv: go_escape(&target.cors.allow_origins.join(", ")),
                methods_csv: go_escape(&target.cors.allow_methods.join(", ")),
                headers_csv: go_escape(&target.cors.allow_headers.join(", ")),
                expose_csv: go_escape(&target.cors.expose_headers.join(", ")),
                credentials: target.cors.allow_credentials,
                max_age: target.cors.max_age,
            },
            docs: DocsView {
                enabled: target.docs.enabled,
                path: go_escape(&target.docs.path),
            },
            middleware: MiddlewareView {
                request_id: uses_middleware("request_id"),
                logger: uses_middleware("logger"),
                recovery: uses_middleware("recovery"),
                cors: target.cors.enabled && uses_middleware("cors"),
                security_headers: uses_middleware("security_headers"),
            },
            has_routes: !routes.is_empty(),
            has_protected: !protected_routes.is_empty(),
            uses_strconv: routes.iter().any(|r| r.has_limit || r.has_offset),
            uses_path_params: routes.iter().any(|r| r.has_id),
            routes,
            public_routes,
            protected_routes,
            shadowed_routes,
            models: build_models(input.project),
        }
    }

    /// Triples of every route, recovered from the framework path
    pub fn triples(&self, style: PathStyle) -> Vec<RouteTriple> {
        self.routes
            .iter()
            .map(|route| RouteTriple {
                method: route.verb,
                path: style.canonical(&route.raw_framework_path),
                operation: route.operation.clone(),
            })
            .collect()
    }

    pub fn shadowed_count(&self) -> usize {
        self.shadowed_routes.len()
    }
}

impl RouteView {
    fn build(route: &RouteSpec, style: PathStyle, auth_enabled: bool) -> Self {
        let framework_path = style.render(&route.path);
        let path_params = route.path_params();
        let has = |name: &str| route.has_parameter(name) || path_params.iter().any(|p| p == name);

        let params = HANDLER_PARAMS
            .iter()
            .copied()
            .filter(|name| has(*name))
            .collect::<Vec<_>>();

        let label = if route.function.is_empty() {
            &route.handler_name
        } else {
            &route.function
        };

        Self {
            method: route.method.as_str(),
            method_title: title_case(route.method.as_str()),
            path: go_escape(&route.path),
            framework_path: go_escape(&framework_path),
            sample_path: go_escape(&sample_path(&route.path)),
            handler: format!("{}Handler", route.handler_name),
            message: go_escape(&format!("{} endpoint", label)),
            operation: route.operation.clone(),
            auth_required: auth_enabled && route.auth.required,
            has_body: matches!(
                route.method,
                HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch
            ),
            has_id: params.contains(&"id"),
            has_q: params.contains(&"q"),
            has_limit: params.contains(&"limit"),
            has_offset: params.contains(&"offset"),
            params,
            parameters: param_views(&route.parameters),
            responses: param_views(&route.responses),
            verb: route.method,
            raw_framework_path: framework_path,
        }
    }
}

fn param_views(params: &[ParameterModel]) -> Vec<ParamView> {
    params
        .iter()
        .map(|p| ParamView {
            name: p.name.clone(),
            type_name: p.type_name.clone(),
        })
        .collect()
}

/// Path with every placeholder name erased, so `/a/{id}` and `/a/{key}`
/// collide the way they do in a router tree
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Concrete request path for smoke tests and curl examples
fn sample_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "123"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn title_case(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Escape text for the inside of a Go interpreted string literal
fn go_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn go_string_slice(items: &[String]) -> String {
    let quoted = items
        .iter()
        .map(|item| format!("\"{}\"", go_escape(item)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[]string{{{}}}", quoted)
}

fn build_models(project: &ProjectModel) -> Vec<ModelView> {
    let mut names = BTreeSet::new();
    let types = project
        .packages()
        .flat_map(|package| package.types.iter())
        .filter(|ty| names.insert(ty.name.clone()))
        .collect::<Vec<_>>();

    let known: HashSet<&str> = names.iter().map(String::as_str).collect();
    types
        .into_iter()
        .map(|ty| ModelView {
            name: ty.name.clone(),
            lower: ty.name.to_lowercase(),
            fields: ty
                .fields
                .iter()
                .filter(|f| !f.embedded && !BASE_FIELDS.contains(&f.name.as_str()))
                .map(|f| ModelFieldView {
                    name: f.name.clone(),
                    go_type: portable_type(&f.type_name, &known),
                    json: json_name(f),
                })
                .collect(),
        })
        .collect()
}

/// The field's json tag, else its snake_case name
fn json_name(field: &FieldModel) -> String {
    match field.tag("json").filter(|tag| !tag.is_empty()) {
        Some(tag) => tag.to_string(),
        None => field.name.to_snake_case(),
    }
}

/// Keep a Go type only when every name in it resolves inside the generated
/// package; anything else becomes `interface{}`
fn portable_type(type_name: &str, known: &HashSet<&str>) -> String {
    let resolvable = type_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .filter(|token| !token.is_empty())
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .all(|token| GO_BUILTINS.contains(&token) || known.contains(token));

    if resolvable && !type_name.trim().is_empty() {
        type_name.to_string()
    } else {
        "interface{}".to_string()
    }
}
