//! Named template sets
//!
//! Each target owns the templates for its entry point, middleware, handlers
//! and route registration. Everything else (models, manifest, docs, tests,
//! deployment descriptors) is shared and framework-neutral. Templates are
//! compiled once per emitter with HTML escaping off and strict mode on, so
//! a context missing a referenced field fails loudly instead of rendering
//! an empty string.

use handlebars::Handlebars;
use routeforge_config::TargetKind;
use serde::Serialize;

use crate::error::{EmitError, Result};

pub const MAIN: &str = "main";
pub const MIDDLEWARE: &str = "middleware";
pub const HANDLERS: &str = "handlers";
pub const ROUTES: &str = "routes";
pub const MODELS: &str = "models";
pub const GO_MOD: &str = "go_mod";
pub const ENV_EXAMPLE: &str = "env_example";
pub const README: &str = "readme";
pub const TESTS: &str = "tests";
pub const DOCS: &str = "docs";
pub const DOCKERFILE: &str = "dockerfile";
pub const K8S_DEPLOYMENT: &str = "k8s_deployment";
pub const K8S_SERVICE: &str = "k8s_service";
pub const K8S_INGRESS: &str = "k8s_ingress";

const SHARED: [(&str, &str); 10] = [
    (MODELS, include_str!("../templates/shared/models.go.hbs")),
    (GO_MOD, include_str!("../templates/shared/go.mod.hbs")),
    (ENV_EXAMPLE, include_str!("../templates/shared/env.example.hbs")),
    (README, include_str!("../templates/shared/README.md.hbs")),
    (TESTS, include_str!("../templates/shared/handlers_test.go.hbs")),
    (DOCS, include_str!("../templates/shared/api.md.hbs")),
    (DOCKERFILE, include_str!("../templates/shared/Dockerfile.hbs")),
    (K8S_DEPLOYMENT, include_str!("../templates/shared/deployment.yaml.hbs")),
    (K8S_SERVICE, include_str!("../templates/shared/service.yaml.hbs")),
    (K8S_INGRESS, include_str!("../templates/shared/ingress.yaml.hbs")),
];

const GIN: [(&str, &str); 4] = [
    (MAIN, include_str!("../templates/gin/main.go.hbs")),
    (MIDDLEWARE, include_str!("../templates/gin/middleware.go.hbs")),
    (HANDLERS, include_str!("../templates/gin/handlers.go.hbs")),
    (ROUTES, include_str!("../templates/gin/routes.go.hbs")),
];

const ECHO: [(&str, &str); 4] = [
    (MAIN, include_str!("../templates/echo/main.go.hbs")),
    (MIDDLEWARE, include_str!("../templates/echo/middleware.go.hbs")),
    (HANDLERS, include_str!("../templates/echo/handlers.go.hbs")),
    (ROUTES, include_str!("../templates/echo/routes.go.hbs")),
];

const CHI: [(&str, &str); 4] = [
    (MAIN, include_str!("../templates/chi/main.go.hbs")),
    (MIDDLEWARE, include_str!("../templates/chi/middleware.go.hbs")),
    (HANDLERS, include_str!("../templates/chi/handlers.go.hbs")),
    (ROUTES, include_str!("../templates/chi/routes.go.hbs")),
];

const FIBER: [(&str, &str); 4] = [
    (MAIN, include_str!("../templates/fiber/main.go.hbs")),
    (MIDDLEWARE, include_str!("../templates/fiber/middleware.go.hbs")),
    (HANDLERS, include_str!("../templates/fiber/handlers.go.hbs")),
    (ROUTES, include_str!("../templates/fiber/routes.go.hbs")),
];

/// Compiled templates for one target
pub struct TemplateSet {
    registry: Handlebars<'static>,
}

impl TemplateSet {
    /// Compile the shared templates plus the target's own
    pub fn for_target(kind: TargetKind) -> Result<Self> {
        let own = match kind {
            TargetKind::Gin => &GIN,
            TargetKind::Echo => &ECHO,
            TargetKind::Chi => &CHI,
            TargetKind::Fiber => &FIBER,
        };

        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        for (name, source) in SHARED.iter().chain(own.iter()) {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    pub fn has(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render a named template with a typed context
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        if !self.has(name) {
            return Err(EmitError::TemplateNotFound(name.to_string()));
        }
        Ok(self.registry.render(name, context)?)
    }
}
