//! Worked examples for mapping, synthesis, validation and plugin order

use std::fs;
use std::sync::Arc;

use routeforge_config::{GeneratorConfig, PluginSettings, ValidationSettings};
use routeforge_patterns::{HttpMethod, PatternMapper};
use routeforge_plugins::{LifecycleEvent, Plugin, PluginContext, PluginManager};
use routeforge_routes::{RouteSource, RouteSynthesizer};
use routeforge_scanner::SourceScanner;
use routeforge_validation::ValidationEngine;
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_get_by_field_uses_type_name_resource() {
    let shape = PatternMapper::new().map("GetUserByEmail", "UserService");
    assert_eq!(shape.method, HttpMethod::Get);
    assert_eq!(shape.path, "/userservices/by/email");
    assert_eq!(shape.operation, "get_by");
    assert!(shape.auto_generated);
}

#[test]
fn test_bulk_create() {
    let shape = PatternMapper::new().map("BulkCreateProducts", "ProductService");
    assert_eq!(shape.method, HttpMethod::Post);
    assert_eq!(shape.path, "/productservices/bulk");
    assert_eq!(shape.operation, "bulk_create");
}

#[test]
fn test_unmatched_method_falls_back_to_custom_post() {
    let shape = PatternMapper::new().map("FooBar", "Widget");
    assert_eq!(shape.method, HttpMethod::Post);
    assert_eq!(shape.path, "/widget/foobar");
    assert_eq!(shape.operation, "custom");
    assert!(!shape.auto_generated);
}

#[test]
fn test_crud_and_smart_routes_are_not_deduplicated() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("order.go"),
        r#"package shop

type Order struct {
	ID string `json:"id"`
}

func (o *Order) GetOrder(id string) (*Order, error) {
	return nil, nil
}
"#,
    )
    .unwrap();

    let config = GeneratorConfig::default();
    let outcome = SourceScanner::new(&config).unwrap().scan(dir.path()).unwrap();
    let mapper = PatternMapper::new();
    let routes = RouteSynthesizer::new(&mapper, &config)
        .synthesize(&outcome.model)
        .unwrap();

    let matching: Vec<_> = routes
        .iter()
        .filter(|r| r.method == HttpMethod::Get && r.path == "/orders/{id}")
        .collect();
    assert_eq!(matching.len(), 2);
    assert!(matching.iter().any(|r| r.source == RouteSource::SmartMapping));
    assert!(matching.iter().any(|r| r.source == RouteSource::Crud));
}

#[test]
fn test_email_validator() {
    let engine = ValidationEngine::new(&ValidationSettings::default()).unwrap();
    assert!(engine.validate_field("email", &json!("a@b.co"), &["email"]).valid);

    let rejected = engine.validate_field("email", &json!("not-an-email"), &["email"]);
    assert!(!rejected.valid);
    assert_eq!(rejected.errors[0].code, "INVALID_EMAIL");
}

#[test]
fn test_password_strength_validator() {
    let engine = ValidationEngine::new(&ValidationSettings::default()).unwrap();
    let rule = engine.rule("password_strength").unwrap();
    assert_eq!(rule.config["min_length"], 8);
    for class in ["require_upper", "require_lower", "require_number", "require_symbol"] {
        assert_eq!(rule.config[class], true, "{}", class);
    }

    let weak = engine.validate_field("password", &json!("abc"), &["password_strength"]);
    assert!(!weak.valid);
    let strong = engine.validate_field("password", &json!("Abcdef1!"), &["password_strength"]);
    assert!(strong.valid, "{:?}", strong.errors);
}

/// Appends its name to `data["order"]`
struct Marker(&'static str);

impl Plugin for Marker {
    fn name(&self) -> &str {
        self.0
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, ctx: &mut PluginContext) -> routeforge_plugins::Result<()> {
        let mut order = ctx
            .data
            .get("order")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        order.push(json!(self.0));
        ctx.data.insert("order".to_string(), Value::Array(order));
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::AfterScan]
    }
}

#[test]
fn test_plugins_run_by_priority_then_registration_order() {
    let manager = PluginManager::new(&PluginSettings::default());
    manager
        .register_with_priority(Arc::new(Marker("low")), 5)
        .unwrap();
    manager
        .register_with_priority(Arc::new(Marker("high")), 10)
        .unwrap();
    manager
        .register_with_priority(Arc::new(Marker("second")), 5)
        .unwrap();

    assert_eq!(
        manager.execution_order(LifecycleEvent::AfterScan).unwrap(),
        vec!["high", "low", "second"]
    );

    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    let report = manager.dispatch(LifecycleEvent::AfterScan, &mut ctx).unwrap();
    assert_eq!(report.executed, vec!["high", "low", "second"]);
    assert_eq!(ctx.data["order"], json!(["high", "low", "second"]));
}
