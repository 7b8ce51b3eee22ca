//! Target emitter trait and the shared emission pipeline

use std::path::PathBuf;

use routeforge_config::{GeneratorConfig, TargetConfig, TargetKind};
use routeforge_routes::RouteSpec;
use routeforge_scanner::ProjectModel;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{GeneratedFile, GeneratedProject};
use crate::templates::{self, TemplateSet};
use crate::view::ProjectView;

/// Go module a target builds on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framework {
    /// Display name, e.g. `Gin`
    pub name: &'static str,
    /// Go import path of the framework module
    pub module: &'static str,
    pub version: &'static str,
}

/// How a framework writes path placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `:name` (gin, echo, fiber)
    Colon,
    /// `{name}` (chi)
    Brace,
}

impl PathStyle {
    /// Rewrite a canonical `{name}` path into this style
    pub fn render(&self, path: &str) -> String {
        match self {
            PathStyle::Brace => path.to_string(),
            PathStyle::Colon => map_segments(path, |segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map(|name| format!(":{}", name))
            }),
        }
    }

    /// Rewrite a path in this style back to canonical `{name}` form
    pub fn canonical(&self, path: &str) -> String {
        match self {
            PathStyle::Brace => path.to_string(),
            PathStyle::Colon => map_segments(path, |segment| {
                segment
                    .strip_prefix(':')
                    .filter(|name| !name.is_empty())
                    .map(|name| format!("{{{}}}", name))
            }),
        }
    }
}

fn map_segments(path: &str, rewrite: impl Fn(&str) -> Option<String>) -> String {
    path.split('/')
        .map(|segment| rewrite(segment).unwrap_or_else(|| segment.to_string()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Everything an emitter reads
#[derive(Debug, Clone, Copy)]
pub struct EmitInput<'a> {
    pub routes: &'a [RouteSpec],
    pub project: &'a ProjectModel,
    pub generator: &'a GeneratorConfig,
    pub target: &'a TargetConfig,
}

/// Produces a complete Go project for one web framework
///
/// Emitters are pure: the same input always yields byte-identical output,
/// and nothing is written until the project is handed to an
/// [`crate::OutputWriter`].
pub trait TargetEmitter: Send + Sync {
    fn kind(&self) -> TargetKind;

    fn framework(&self) -> Framework;

    /// Placeholder syntax used in route registration
    fn path_style(&self) -> PathStyle {
        PathStyle::Colon
    }

    fn templates(&self) -> &TemplateSet;

    /// Render the full project
    fn emit(&self, input: &EmitInput<'_>) -> Result<GeneratedProject> {
        emit_project(self, input)
    }
}

/// Shared emission pipeline used by every built-in target
pub fn emit_project<E: TargetEmitter + ?Sized>(
    emitter: &E,
    input: &EmitInput<'_>,
) -> Result<GeneratedProject> {
    let kind = emitter.kind();
    let style = emitter.path_style();
    let view = ProjectView::build(kind, emitter.framework(), style, input);
    let set = emitter.templates();

    let mut plan: Vec<(&str, &str)> = vec![
        (templates::MAIN, "main.go"),
        (templates::MIDDLEWARE, "middleware.go"),
        (templates::HANDLERS, "handlers.go"),
        (templates::ROUTES, "routes.go"),
        (templates::MODELS, "models.go"),
        (templates::GO_MOD, "go.mod"),
        (templates::ENV_EXAMPLE, ".env.example"),
        (templates::README, "README.md"),
    ];
    if input.target.testing.enabled {
        plan.push((templates::TESTS, "tests/handlers_test.go"));
    }
    if input.target.docs.enabled {
        plan.push((templates::DOCS, "docs/api.md"));
    }
    if input.target.deployment.docker {
        plan.push((templates::DOCKERFILE, "Dockerfile"));
    }
    if input.target.deployment.kubernetes {
        plan.push((templates::K8S_DEPLOYMENT, "k8s/deployment.yaml"));
        plan.push((templates::K8S_SERVICE, "k8s/service.yaml"));
        plan.push((templates::K8S_INGRESS, "k8s/ingress.yaml"));
    }

    let mut files = Vec::with_capacity(plan.len());
    for (template, path) in plan {
        debug!(target_name = %kind, file = path, "Rendering file");
        let content = set.render(template, &view)?;
        files.push(GeneratedFile::new(PathBuf::from(path), content));
    }

    let triples = view.triples(style);
    info!(
        target_name = %kind,
        files = files.len(),
        routes = triples.len(),
        shadowed = view.shadowed_count(),
        "Emitted target project"
    );

    Ok(GeneratedProject {
        target: kind,
        files,
        triples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colon_style_round_trips_placeholders() {
        let style = PathStyle::Colon;
        assert_eq!(style.render("/users/{id}/roles/{role}"), "/users/:id/roles/:role");
        assert_eq!(style.canonical("/users/:id/roles/:role"), "/users/{id}/roles/{role}");
        assert_eq!(style.render("/users/search"), "/users/search");
    }

    #[test]
    fn test_brace_style_is_identity() {
        assert_eq!(PathStyle::Brace.render("/users/{id}"), "/users/{id}");
        assert_eq!(PathStyle::Brace.canonical("/users/{id}"), "/users/{id}");
    }

    #[test]
    fn test_lone_colon_segment_is_literal() {
        assert_eq!(PathStyle::Colon.canonical("/a/:/b"), "/a/:/b");
    }
}
