use routeforge_config::GeneratorConfig;
use routeforge_patterns::{HttpMethod, PatternMapper};
use routeforge_routes::{RouteSource, RouteSynthesizer};
use routeforge_scanner::{
    AnnotationModel, MethodModel, PackageModel, ParameterModel, ProjectModel, TypeModel,
};

fn method(name: &str, receiver: &str, params: &[(&str, &str)], returns: &[&str]) -> MethodModel {
    MethodModel {
        name: name.to_string(),
        receiver: Some(format!("*{}", receiver)),
        parameters: params
            .iter()
            .map(|(n, t)| ParameterModel::new(*n, *t))
            .collect(),
        returns: returns.iter().map(|t| ParameterModel::anonymous(*t)).collect(),
        ..Default::default()
    }
}

fn project(types: Vec<TypeModel>, functions: Vec<MethodModel>) -> ProjectModel {
    let mut model = ProjectModel::new("/src");
    model.packages.insert(
        "shop".to_string(),
        PackageModel {
            key: "shop".to_string(),
            name: "shop".to_string(),
            import_path: "shop".to_string(),
            types,
            functions,
            ..Default::default()
        },
    );
    model
}

fn order_type() -> TypeModel {
    TypeModel {
        name: "Order".to_string(),
        methods: vec![method("GetOrder", "Order", &[("id", "string")], &["*Order", "error"])],
        ..Default::default()
    }
}

#[test]
fn crud_and_smart_routes_are_not_deduplicated() {
    let mapper = PatternMapper::new();
    let routes = RouteSynthesizer::new(&mapper, &GeneratorConfig::default())
        .synthesize(&project(vec![order_type()], Vec::new()))
        .unwrap();

    let matching: Vec<_> = routes
        .iter()
        .filter(|r| r.method == HttpMethod::Get && r.path == "/orders/{id}")
        .collect();
    assert_eq!(matching.len(), 2);
    assert_eq!(matching[0].source, RouteSource::SmartMapping);
    assert_eq!(matching[1].source, RouteSource::Crud);
    assert_ne!(matching[0].handler_name, matching[1].handler_name);
}

#[test]
fn toggles_disable_sources() {
    let mapper = PatternMapper::new();
    let config = GeneratorConfig {
        auto_crud: false,
        ..Default::default()
    };
    let routes = RouteSynthesizer::new(&mapper, &config)
        .synthesize(&project(vec![order_type()], Vec::new()))
        .unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].operation, "get");
    assert_eq!(routes[0].parameters, vec![ParameterModel::new("id", "string")]);
    assert_eq!(routes[0].responses, vec![ParameterModel::anonymous("*Order")]);

    let config = GeneratorConfig {
        auto_crud: false,
        smart_mapping: false,
        ..Default::default()
    };
    let routes = RouteSynthesizer::new(&mapper, &config)
        .synthesize(&project(vec![order_type()], Vec::new()))
        .unwrap();
    assert!(routes.is_empty());
}

#[test]
fn unmatched_methods_are_not_routed() {
    let mapper = PatternMapper::new();
    let config = GeneratorConfig {
        auto_crud: false,
        ..Default::default()
    };
    let ty = TypeModel {
        name: "Widget".to_string(),
        methods: vec![method("FooBar", "Widget", &[], &[])],
        ..Default::default()
    };
    let routes = RouteSynthesizer::new(&mapper, &config)
        .synthesize(&project(vec![ty], Vec::new()))
        .unwrap();
    assert!(routes.is_empty());
}

#[test]
fn endpoint_annotations_on_functions() {
    let mapper = PatternMapper::new();
    let config = GeneratorConfig {
        auto_crud: false,
        smart_mapping: false,
        ..Default::default()
    };
    let mut health = MethodModel {
        name: "HealthCheck".to_string(),
        returns: vec![ParameterModel::anonymous("string")],
        ..Default::default()
    };
    let mut endpoint = AnnotationModel::new("endpoint", "/status");
    endpoint.config.insert("method".to_string(), "HEAD".to_string());
    health.annotations.push(endpoint);
    health.annotations.push(AnnotationModel::new("auth", "required"));

    let routes = RouteSynthesizer::new(&mapper, &config)
        .synthesize(&project(Vec::new(), vec![health]))
        .unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].method, HttpMethod::Head);
    assert_eq!(routes[0].path, "/status");
    assert_eq!(routes[0].function, "HealthCheck");
    assert!(routes[0].type_name.is_none());
    assert!(routes[0].auth.required);
    assert!(!routes[0].auto_generated());
}

#[test]
fn output_order_is_annotation_smart_crud() {
    let mapper = PatternMapper::new();
    let mut ty = order_type();
    ty.annotations.push(AnnotationModel::new("route", "/custom-orders"));

    let routes = RouteSynthesizer::new(&mapper, &GeneratorConfig::default())
        .synthesize(&project(vec![ty], Vec::new()))
        .unwrap();

    let sources: Vec<RouteSource> = routes.iter().map(|r| r.source).collect();
    assert_eq!(sources[0], RouteSource::Annotation);
    assert_eq!(sources[1], RouteSource::SmartMapping);
    assert!(sources[2..].iter().all(|s| *s == RouteSource::Crud));
    assert_eq!(routes.len(), 7);
}

#[test]
fn synthesis_is_deterministic() {
    let mapper = PatternMapper::new();
    let synth = RouteSynthesizer::new(&mapper, &GeneratorConfig::default());
    let model = project(vec![order_type()], Vec::new());
    assert_eq!(synth.synthesize(&model).unwrap(), synth.synthesize(&model).unwrap());
}
