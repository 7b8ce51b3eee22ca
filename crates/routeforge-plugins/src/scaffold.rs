//! Starter skeletons for subprocess plugins

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::discovery::JSON_DESCRIPTOR;
use crate::error::{PluginError, Result};
use crate::plugin::ALL_FRAMEWORKS;
use crate::types::{LifecycleEvent, PluginDescriptor};

const SCRIPT_TEMPLATE: &str = include_str!("../templates/plugin.sh.hbs");
const SCRIPT_FILE: &str = "plugin.sh";

#[derive(Serialize)]
struct ScriptContext<'a> {
    name: &'a str,
    version: &'a str,
    events: Vec<&'static str>,
}

fn check_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PluginError::Scaffold(format!(
            "'{}' is not a valid plugin name (use letters, digits, '-' and '_')",
            name
        )))
    }
}

/// Create `<parent>/<name>/` with a `plugin.json` and an executable script
///
/// An empty event list subscribes the plugin to `after_scan`. The target
/// directory must not exist yet.
pub fn scaffold_plugin(parent: &Path, name: &str, events: &[LifecycleEvent]) -> Result<PathBuf> {
    check_name(name)?;
    let dir = parent.join(name);
    if dir.exists() {
        return Err(PluginError::Scaffold(format!(
            "{} already exists",
            dir.display()
        )));
    }

    let events = if events.is_empty() {
        vec![LifecycleEvent::AfterScan]
    } else {
        events.to_vec()
    };

    let descriptor = PluginDescriptor {
        name: name.to_string(),
        version: "0.1.0".to_string(),
        description: format!("{} plugin", name),
        author: String::new(),
        homepage: None,
        repository: None,
        license: None,
        main_file: SCRIPT_FILE.to_string(),
        dependencies: Vec::new(),
        supported_frameworks: ALL_FRAMEWORKS.iter().map(|f| f.to_string()).collect(),
        supported_events: events.clone(),
        config_schema: json!({"type": "object", "properties": {}}),
        tags: Vec::new(),
        category: None,
        priority: None,
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(SCRIPT_FILE, SCRIPT_TEMPLATE)?;
    let script = handlebars.render(
        SCRIPT_FILE,
        &ScriptContext {
            name,
            version: &descriptor.version,
            events: events.iter().map(LifecycleEvent::as_str).collect(),
        },
    )?;

    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join(JSON_DESCRIPTOR),
        serde_json::to_string_pretty(&descriptor)? + "\n",
    )?;
    let script_path = dir.join(SCRIPT_FILE);
    fs::write(&script_path, script)?;
    make_executable(&script_path)?;

    info!(plugin = %name, path = %dir.display(), "Scaffolded plugin");
    Ok(dir)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::discovery::load_descriptor;

    #[test]
    fn test_scaffold_writes_descriptor_and_script() {
        let temp = TempDir::new().unwrap();
        let dir = scaffold_plugin(
            temp.path(),
            "audit",
            &[LifecycleEvent::AfterScan, LifecycleEvent::RouteGenerated],
        )
        .unwrap();

        let descriptor = load_descriptor(&dir).unwrap();
        assert_eq!(descriptor.main_file, "plugin.sh");
        assert_eq!(descriptor.supported_events.len(), 2);

        let script = fs::read_to_string(dir.join("plugin.sh")).unwrap();
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("after_scan, route_generated"));
        assert!(script.contains(r#"{"data":{"audit":"#));
    }

    #[test]
    fn test_scaffold_rejects_bad_names_and_existing_dirs() {
        let temp = TempDir::new().unwrap();
        assert!(scaffold_plugin(temp.path(), "", &[]).is_err());
        assert!(scaffold_plugin(temp.path(), "../escape", &[]).is_err());

        scaffold_plugin(temp.path(), "once", &[]).unwrap();
        assert!(matches!(
            scaffold_plugin(temp.path(), "once", &[]),
            Err(PluginError::Scaffold(_))
        ));
    }
}
