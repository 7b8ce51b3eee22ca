//! Integration tests for failure policy, dependency gating and the
//! subprocess protocol

use std::fs;
use std::sync::Arc;

use routeforge_config::PluginSettings;
use routeforge_plugins::*;
use serde_json::json;
use tempfile::TempDir;

struct Failing;

impl Plugin for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        Err(PluginError::execution("failing", ctx.event, "refused"))
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::AfterScan]
    }
}

struct Marker;

impl Plugin for Marker {
    fn name(&self) -> &str {
        "marker"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        ctx.data.insert("marked".to_string(), json!(true));
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::AfterScan]
    }
}

struct Tagger;

impl Plugin for Tagger {
    fn name(&self) -> &str {
        "tagger"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        ctx.metadata.insert("tagged_by".to_string(), json!("tagger"));
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::AfterScan]
    }
}

struct TagReader;

impl Plugin for TagReader {
    fn name(&self) -> &str {
        "tag-reader"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, ctx: &mut PluginContext) -> Result<()> {
        let seen = ctx.metadata.get("tagged_by").cloned().unwrap_or(json!(null));
        ctx.data.insert("seen_tag".to_string(), seen);
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::AfterScan]
    }
}

fn manager_with(sandbox_mode: bool) -> PluginManager {
    let manager = PluginManager::new(&PluginSettings {
        sandbox_mode,
        ..Default::default()
    });
    manager.register_with_priority(Arc::new(Failing), 10).unwrap();
    manager.register_with_priority(Arc::new(Marker), 1).unwrap();
    manager
}

#[test]
fn test_sandbox_mode_continues_after_failure() {
    let manager = manager_with(true);
    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    let report = manager.dispatch(LifecycleEvent::AfterScan, &mut ctx).unwrap();

    assert_eq!(report.executed, vec!["marker"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "failing");
    assert_eq!(ctx.data["marked"], true);
}

#[test]
fn test_strict_mode_aborts_on_failure() {
    let manager = manager_with(false);
    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    let err = manager
        .dispatch(LifecycleEvent::AfterScan, &mut ctx)
        .unwrap_err();

    match err {
        PluginError::Execution { plugin, event, message } => {
            assert_eq!(plugin, "failing");
            assert_eq!(event, "after_scan");
            assert_eq!(message, "refused");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!ctx.data.contains_key("marked"));
}

#[test]
fn test_dependency_must_be_registered() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("reporter");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.json"),
        r#"{"name": "reporter", "main_file": "run.sh", "dependencies": [{"name": "metrics"}]}"#,
    )
    .unwrap();

    let manager = PluginManager::new(&PluginSettings::default());
    assert!(matches!(
        manager.load_plugin(&dir),
        Err(PluginError::MissingDependency { ref plugin, ref dependency })
            if plugin == "reporter" && dependency == "metrics"
    ));
    assert!(!manager.contains("reporter"));

    manager.register_builtins().unwrap();
    assert_eq!(manager.load_plugin(&dir).unwrap(), "reporter");
}

#[test]
fn test_unsatisfied_dependency_reported_by_directory_load() {
    let temp = TempDir::new().unwrap();
    for (dir, body) in [
        ("ok", r#"{"name": "ok", "main_file": "run.sh"}"#),
        (
            "orphan",
            r#"{"name": "orphan", "main_file": "run.sh", "dependencies": [{"name": "nowhere"}]}"#,
        ),
        ("broken", "{not json"),
    ] {
        let path = temp.path().join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("plugin.json"), body).unwrap();
    }

    let manager = PluginManager::new(&PluginSettings::default());
    let report = manager.load_directory(temp.path()).unwrap();
    assert_eq!(report.loaded, vec!["ok"]);
    assert_eq!(report.failed.len(), 2);
    assert!(report
        .failed
        .iter()
        .any(|(_, message)| message.contains("nowhere")));
}

#[test]
fn test_descriptor_priority_is_applied() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("early");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.json"),
        r#"{"name": "early", "main_file": "run.sh", "priority": 42, "supported_events": ["after_scan"]}"#,
    )
    .unwrap();

    let manager = PluginManager::new(&PluginSettings::default());
    manager.register_builtins().unwrap();
    manager.load_plugin(&dir).unwrap();
    assert_eq!(
        manager.execution_order(LifecycleEvent::AfterScan).unwrap()[0],
        "early"
    );
}

#[cfg(unix)]
#[test]
fn test_scaffolded_plugin_speaks_protocol() {
    let temp = TempDir::new().unwrap();
    scaffold_plugin(temp.path(), "echoer", &[LifecycleEvent::AfterScan]).unwrap();

    let manager = PluginManager::new(&PluginSettings {
        sandbox_mode: false,
        ..Default::default()
    });
    let report = manager.load_directory(temp.path()).unwrap();
    assert_eq!(report.loaded, vec!["echoer"]);

    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    manager.dispatch(LifecycleEvent::AfterScan, &mut ctx).unwrap();
    assert_eq!(ctx.data["echoer"]["last_event"], "after_scan");
}

#[cfg(unix)]
#[test]
fn test_subprocess_error_field_fails_plugin() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("grumpy");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.json"),
        r#"{"name": "grumpy", "main_file": "run.sh", "supported_events": ["after_scan"]}"#,
    )
    .unwrap();
    let script = dir.join("run.sh");
    fs::write(
        &script,
        "#!/bin/sh\ncat > /dev/null\necho '{\"error\": \"no thanks\"}'\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let manager = PluginManager::new(&PluginSettings {
        sandbox_mode: false,
        ..Default::default()
    });
    manager.load_plugin(&dir).unwrap();

    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    let err = manager
        .dispatch(LifecycleEvent::AfterScan, &mut ctx)
        .unwrap_err();
    assert!(err.to_string().contains("no thanks"));
}

#[test]
fn test_metadata_flows_to_later_plugins_and_caller() {
    let manager = PluginManager::new(&PluginSettings::default());
    manager.register_with_priority(Arc::new(TagReader), 1).unwrap();
    manager.register_with_priority(Arc::new(Tagger), 10).unwrap();

    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan).with_metadata("package_count", 2);
    let report = manager.dispatch(LifecycleEvent::AfterScan, &mut ctx).unwrap();

    assert_eq!(report.executed, vec!["tagger", "tag-reader"]);
    assert_eq!(ctx.data["seen_tag"], "tagger");
    assert_eq!(ctx.metadata["tagged_by"], "tagger");
    assert_eq!(ctx.metadata["package_count"], 2);
}

#[cfg(unix)]
#[test]
fn test_chatty_plugin_with_large_context_completes() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("chatty");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("plugin.json"),
        r#"{"name": "chatty", "main_file": "run.sh", "supported_events": ["after_scan"]}"#,
    )
    .unwrap();
    // Fills the stdout pipe before reading any of stdin
    let script = dir.join("run.sh");
    fs::write(
        &script,
        "#!/bin/sh\nhead -c 262144 /dev/zero | tr '\\0' ' '\nprintf '{\"data\": {\"chatty\": \"done\"}}'\ncat > /dev/null\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let manager = PluginManager::new(&PluginSettings {
        sandbox_mode: false,
        ..Default::default()
    });
    manager.load_plugin(&dir).unwrap();

    let mut ctx = PluginContext::new(LifecycleEvent::AfterScan);
    ctx.data.insert("payload".to_string(), json!("x".repeat(1 << 20)));
    manager.dispatch(LifecycleEvent::AfterScan, &mut ctx).unwrap();
    assert_eq!(ctx.data["chatty"], "done");
}
