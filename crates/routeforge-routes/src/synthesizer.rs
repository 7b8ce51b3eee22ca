//! Route synthesis
//!
//! Three independent sources contribute routes for every type: explicit
//! annotations, method-name inference and the fixed CRUD set. Their output is
//! concatenated as is. Two sources producing the same verb and path yield two
//! routes.

use std::collections::{BTreeMap, BTreeSet};

use heck::ToUpperCamelCase;
use routeforge_config::GeneratorConfig;
use routeforge_patterns::{resource_name, HttpMethod, PatternMapper, CUSTOM_OPERATION};
use routeforge_scanner::{
    AnnotationModel, MethodModel, PackageModel, ParameterModel, ProjectModel, TypeModel,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, RouteError},
    inference::{parameters_for, responses_for},
    route::{AuthRequirement, RouteSource, RouteSpec},
};

const ROUTE_KEY: &str = "route";
const ENDPOINT_KEY: &str = "endpoint";

/// Builds the route list for a scanned project
#[derive(Debug, Clone)]
pub struct RouteSynthesizer<'m> {
    mapper: &'m PatternMapper,
    smart_mapping: bool,
    auto_crud: bool,
    strict: bool,
}

impl<'m> RouteSynthesizer<'m> {
    /// Create a synthesizer using the generator's smart-mapping and CRUD toggles
    pub fn new(mapper: &'m PatternMapper, config: &GeneratorConfig) -> Self {
        Self {
            mapper,
            smart_mapping: config.smart_mapping,
            auto_crud: config.auto_crud,
            strict: false,
        }
    }

    /// Fail on malformed annotations instead of skipping them
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Produce every route for `model` in deterministic order
    pub fn synthesize(&self, model: &ProjectModel) -> Result<Vec<RouteSpec>> {
        let mut routes = Vec::new();

        for package in model.packages() {
            for ty in &package.types {
                let before = routes.len();
                routes.extend(self.annotation_routes(package, ty)?);
                if self.smart_mapping {
                    routes.extend(self.smart_routes(package, ty));
                }
                if self.auto_crud {
                    routes.extend(crud_routes(package, ty));
                }
                debug!(
                    package = %package.key,
                    type_name = %ty.name,
                    route_count = routes.len() - before,
                    "Type routes synthesized"
                );
            }

            for function in &package.functions {
                routes.extend(self.endpoint_routes(package, function)?);
            }
        }

        assign_unique_handler_names(&mut routes);
        info!(route_count = routes.len(), "Routes synthesized");
        Ok(routes)
    }

    /// Routes declared with `@api.route` on a type, one per listed verb
    pub fn annotation_routes(&self, package: &PackageModel, ty: &TypeModel) -> Result<Vec<RouteSpec>> {
        let mut routes = Vec::new();

        for annotation in ty.annotations_with_key(ROUTE_KEY) {
            let Some(path) = self.route_path(annotation, &ty.name)? else {
                continue;
            };
            let bag = config_bag(annotation, &ty.annotations);
            let methods = self.methods_from(&bag, "methods", &ty.name)?;
            let verbs: Vec<Value> = methods.iter().map(|m| json!(m.as_str())).collect();

            for method in methods {
                let mut metadata = string_metadata(&bag);
                metadata.insert("methods".to_string(), Value::Array(verbs.clone()));
                metadata.insert("auto_generated".to_string(), Value::Bool(false));

                routes.push(RouteSpec {
                    method,
                    path: path.clone(),
                    package: package.name.clone(),
                    type_name: Some(ty.name.clone()),
                    function: String::new(),
                    handler_name: format!(
                        "{}{}",
                        ty.name.to_upper_camel_case(),
                        method.as_str().to_upper_camel_case()
                    ),
                    operation: operation_from(&bag),
                    source: RouteSource::Annotation,
                    parameters: Vec::new(),
                    responses: Vec::new(),
                    auth: AuthRequirement::from_value(bag.get("auth").map(String::as_str)),
                    metadata,
                });
            }
        }

        Ok(routes)
    }

    /// Routes inferred from the type's method names
    pub fn smart_routes(&self, package: &PackageModel, ty: &TypeModel) -> Vec<RouteSpec> {
        ty.methods
            .iter()
            .filter_map(|method| {
                let shape = self.mapper.map(&method.name, &ty.name);
                if !shape.is_matched() || !shape.auto_generated {
                    return None;
                }

                let mut metadata = BTreeMap::new();
                metadata.insert("auto_generated".to_string(), Value::Bool(true));
                metadata.insert("smart_mapping".to_string(), Value::Bool(true));
                metadata.insert("operation".to_string(), json!(shape.operation));
                metadata.insert("method_patterns".to_string(), json!(shape.method_patterns));
                metadata.insert("intelligent_route".to_string(), Value::Bool(true));

                Some(RouteSpec {
                    method: shape.method,
                    path: shape.path,
                    package: package.name.clone(),
                    type_name: Some(ty.name.clone()),
                    function: method.name.clone(),
                    handler_name: method.name.to_upper_camel_case(),
                    parameters: parameters_for(&shape.operation, method),
                    responses: responses_for(&shape.operation, method),
                    operation: shape.operation,
                    source: RouteSource::SmartMapping,
                    auth: AuthRequirement::default(),
                    metadata,
                })
            })
            .collect()
    }

    /// Routes declared with `@api.endpoint` on a function or method
    pub fn endpoint_routes(
        &self,
        package: &PackageModel,
        function: &MethodModel,
    ) -> Result<Vec<RouteSpec>> {
        let mut routes = Vec::new();

        for annotation in function.annotations_with_key(ENDPOINT_KEY) {
            let Some(path) = self.route_path(annotation, &function.name)? else {
                continue;
            };
            let bag = config_bag(annotation, &function.annotations);
            let Some(method) = self.methods_from(&bag, "method", &function.name)?.first().copied()
            else {
                continue;
            };

            let mut metadata = string_metadata(&bag);
            metadata.insert("auto_generated".to_string(), Value::Bool(false));

            routes.push(RouteSpec {
                method,
                path,
                package: package.name.clone(),
                type_name: function.receiver_type_name().map(str::to_string),
                function: function.name.clone(),
                handler_name: function.name.to_upper_camel_case(),
                operation: operation_from(&bag),
                source: RouteSource::Annotation,
                parameters: function.parameters.clone(),
                responses: function.returns.clone(),
                auth: AuthRequirement::from_value(bag.get("auth").map(String::as_str)),
                metadata,
            });
        }

        Ok(routes)
    }

    fn route_path(&self, annotation: &AnnotationModel, owner: &str) -> Result<Option<String>> {
        let path = annotation.value.trim();
        if path.is_empty() {
            if self.strict {
                return Err(RouteError::EmptyPath {
                    owner: owner.to_string(),
                });
            }
            warn!(owner = %owner, key = %annotation.key, "Skipping annotation without path");
            return Ok(None);
        }
        Ok(Some(if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }))
    }

    /// Verbs listed under `key`, `GET` when absent
    fn methods_from(
        &self,
        bag: &BTreeMap<String, String>,
        key: &str,
        owner: &str,
    ) -> Result<Vec<HttpMethod>> {
        let Some(raw) = bag.get(key) else {
            return Ok(vec![HttpMethod::Get]);
        };

        let mut methods = Vec::new();
        let mut rejected = Vec::new();
        for token in raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match token.parse::<HttpMethod>() {
                Ok(method) if !methods.contains(&method) => methods.push(method),
                Ok(_) => {}
                Err(_) if self.strict => {
                    return Err(RouteError::InvalidMethod {
                        owner: owner.to_string(),
                        method: token.to_string(),
                    })
                }
                Err(_) => rejected.push(token),
            }
        }

        if methods.is_empty() && raw.trim().is_empty() {
            methods.push(HttpMethod::Get);
        }
        if !rejected.is_empty() {
            if methods.is_empty() {
                warn!(owner = %owner, key, rejected = ?rejected, "Route annotation has no valid HTTP method; no routes generated");
            } else {
                warn!(owner = %owner, key, rejected = ?rejected, "Skipping unknown HTTP methods");
            }
        }
        Ok(methods)
    }
}

/// The fixed list/create/get/update/delete set for one type
pub fn crud_routes(package: &PackageModel, ty: &TypeModel) -> Vec<RouteSpec> {
    let collection = format!("/{}", resource_name(&ty.name));
    let item = format!("{}/{{id}}", collection);
    let id = || ParameterModel::new("id", "string");
    let body = || ParameterModel::anonymous(ty.name.clone());

    let rows: [(HttpMethod, &str, &str, Vec<ParameterModel>, Vec<ParameterModel>); 5] = [
        (HttpMethod::Get, "List", "list", Vec::new(), Vec::new()),
        (HttpMethod::Post, "Create", "create", vec![body()], Vec::new()),
        (HttpMethod::Get, "Get", "get", Vec::new(), vec![body()]),
        (HttpMethod::Put, "Update", "update", vec![id(), body()], Vec::new()),
        (HttpMethod::Delete, "Delete", "delete", vec![id()], Vec::new()),
    ];

    rows.into_iter()
        .map(|(method, verb, operation, parameters, responses)| {
            let function = format!("{}{}", verb, ty.name);
            let mut metadata = BTreeMap::new();
            metadata.insert("auto_generated".to_string(), Value::Bool(true));
            metadata.insert("operation".to_string(), json!(operation));

            RouteSpec {
                method,
                path: if matches!(operation, "list" | "create") {
                    collection.clone()
                } else {
                    item.clone()
                },
                package: package.name.clone(),
                type_name: Some(ty.name.clone()),
                handler_name: function.to_upper_camel_case(),
                function,
                operation: operation.to_string(),
                source: RouteSource::Crud,
                parameters,
                responses,
                auth: AuthRequirement::default(),
                metadata,
            }
        })
        .collect()
}

/// Merge the annotation's own bag with its sibling directives.
///
/// Siblings fill keys the annotation did not set; `@api.auth.<scheme>` sets
/// `auth` to the scheme.
fn config_bag(primary: &AnnotationModel, siblings: &[AnnotationModel]) -> BTreeMap<String, String> {
    let mut bag = primary.config.clone();
    for sibling in siblings {
        if sibling.key == ROUTE_KEY || sibling.key == ENDPOINT_KEY {
            continue;
        }
        let (key, value) = match sibling.key.strip_prefix("auth.") {
            Some(scheme) => ("auth".to_string(), scheme.to_string()),
            None => (sibling.key.clone(), sibling.value.clone()),
        };
        bag.entry(key).or_insert(value);
    }
    bag
}

fn string_metadata(bag: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    bag.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

fn operation_from(bag: &BTreeMap<String, String>) -> String {
    bag.get("operation")
        .filter(|o| !o.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| CUSTOM_OPERATION.to_string())
}

/// Suffix repeated handler names with a counter so generated Go compiles
fn assign_unique_handler_names(routes: &mut [RouteSpec]) {
    let mut used = BTreeSet::new();
    for route in routes.iter_mut() {
        if used.insert(route.handler_name.clone()) {
            continue;
        }
        let base = route.handler_name.clone();
        let mut n = 2;
        while !used.insert(format!("{}{}", base, n)) {
            n += 1;
        }
        route.handler_name = format!("{}{}", base, n);
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;

    fn package_with(ty: TypeModel) -> PackageModel {
        PackageModel {
            key: "orders".to_string(),
            name: "orders".to_string(),
            types: vec![ty],
            ..Default::default()
        }
    }

    fn annotation(key: &str, value: &str, config: &[(&str, &str)]) -> AnnotationModel {
        AnnotationModel {
            key: key.to_string(),
            value: value.to_string(),
            config: config
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_route_annotation_per_method() {
        let mapper = PatternMapper::new();
        let synth = RouteSynthesizer::new(&mapper, &GeneratorConfig::default());
        let ty = TypeModel {
            name: "OrderService".to_string(),
            annotations: vec![annotation(
                "route",
                "/orders",
                &[("methods", "GET,POST"), ("auth", "required"), ("owner", "billing")],
            )],
            ..Default::default()
        };

        let routes = synth.annotation_routes(&package_with(ty.clone()), &ty).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, HttpMethod::Get);
        assert_eq!(routes[1].method, HttpMethod::Post);
        assert!(routes[0].auth.required);
        assert_eq!(routes[0].metadata["owner"], json!("billing"));
        assert_eq!(routes[0].metadata["methods"], json!(["GET", "POST"]));
        assert_eq!(routes[0].handler_name, "OrderServiceGet");
    }

    #[test]
    fn test_sibling_annotations_fill_bag() {
        let mapper = PatternMapper::new();
        let synth = RouteSynthesizer::new(&mapper, &GeneratorConfig::default());
        let ty = TypeModel {
            name: "Report".to_string(),
            annotations: vec![
                annotation("route", "reports", &[]),
                annotation("methods", "GET, PUT", &[]),
                annotation("auth.jwt", "", &[]),
                annotation("doc.summary", "Reports", &[]),
            ],
            ..Default::default()
        };

        let routes = synth.annotation_routes(&package_with(ty.clone()), &ty).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/reports");
        assert_eq!(routes[1].method, HttpMethod::Put);
        assert!(routes[0].auth.required);
        assert_eq!(routes[0].auth.scheme.as_deref(), Some("jwt"));
        assert_eq!(routes[0].metadata["doc.summary"], json!("Reports"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_method() {
        let mapper = PatternMapper::new();
        let ty = TypeModel {
            name: "Thing".to_string(),
            annotations: vec![annotation("route", "/things", &[("methods", "FETCH")])],
            ..Default::default()
        };
        let package = package_with(ty.clone());

        let lenient = RouteSynthesizer::new(&mapper, &GeneratorConfig::default());
        assert!(lenient.annotation_routes(&package, &ty).unwrap().is_empty());

        let strict = lenient.clone().strict(true);
        assert!(matches!(
            strict.annotation_routes(&package, &ty),
            Err(RouteError::InvalidMethod { .. })
        ));
    }

    struct WarningMessages(Arc<Mutex<Vec<String>>>);

    struct MessageField<'a>(&'a mut String);

    impl Visit for MessageField<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for WarningMessages {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                let mut message = String::new();
                event.record(&mut MessageField(&mut message));
                self.0.lock().unwrap().push(message);
            }
        }
    }

    #[test]
    fn test_all_unknown_methods_warn_once() {
        let mapper = PatternMapper::new();
        let synth = RouteSynthesizer::new(&mapper, &GeneratorConfig::default());
        let ty = TypeModel {
            name: "Thing".to_string(),
            annotations: vec![annotation("route", "/things", &[("methods", "FETCH, YANK")])],
            ..Default::default()
        };
        let package = package_with(ty.clone());

        let warnings = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(WarningMessages(Arc::clone(&warnings)));
        let routes = tracing::subscriber::with_default(subscriber, || {
            synth.annotation_routes(&package, &ty).unwrap()
        });

        assert!(routes.is_empty());
        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no routes generated"));
    }

    #[test]
    fn test_crud_set() {
        let ty = TypeModel {
            name: "Order".to_string(),
            ..Default::default()
        };
        let routes = crud_routes(&package_with(ty.clone()), &ty);
        let triples: Vec<_> = routes
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str(), r.operation.as_str()))
            .collect();
        assert_eq!(
            triples,
            vec![
                ("GET", "/orders", "list"),
                ("POST", "/orders", "create"),
                ("GET", "/orders/{id}", "get"),
                ("PUT", "/orders/{id}", "update"),
                ("DELETE", "/orders/{id}", "delete"),
            ]
        );
        assert!(routes.iter().all(|r| r.auto_generated()));
        assert_eq!(routes[2].handler_name, "GetOrder");
    }

    #[test]
    fn test_unique_handler_names() {
        let ty = TypeModel {
            name: "Order".to_string(),
            ..Default::default()
        };
        let mut routes = crud_routes(&package_with(ty.clone()), &ty);
        routes.extend(crud_routes(&package_with(ty.clone()), &ty));
        assign_unique_handler_names(&mut routes);

        let names: BTreeSet<_> = routes.iter().map(|r| r.handler_name.clone()).collect();
        assert_eq!(names.len(), routes.len());
        assert_eq!(routes[7].handler_name, "GetOrder2");
    }
}
