//! Target-specific validation snippets

use handlebars::Handlebars;
use serde::Serialize;
use tracing::error;

use crate::error::Result;

const TEMPLATES: &[(&str, &str, &str)] = &[
    ("gin", "middleware", include_str!("../templates/gin_middleware.hbs")),
    ("gin", "field", include_str!("../templates/gin_field.hbs")),
    ("echo", "middleware", include_str!("../templates/echo_middleware.hbs")),
    ("chi", "middleware", include_str!("../templates/chi_middleware.hbs")),
    ("fiber", "middleware", include_str!("../templates/fiber_middleware.hbs")),
];

#[derive(Serialize)]
struct SnippetContext<'a> {
    target: &'a str,
    kind: &'a str,
}

/// Placeholder returned for unsupported `(target, kind)` pairs
pub fn placeholder(target: &str, kind: &str) -> String {
    format!("// No template available for {} {}\n", target, kind)
}

fn template_name(target: &str, kind: &str) -> String {
    format!("{}_{}", target, kind)
}

/// Renders validation snippets from the built-in templates
pub struct SnippetRenderer {
    registry: Handlebars<'static>,
}

impl SnippetRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        for (target, kind, source) in TEMPLATES {
            registry.register_template_string(&template_name(target, kind), *source)?;
        }
        Ok(Self { registry })
    }

    /// Whether a template exists for the pair
    pub fn supports(&self, target: &str, kind: &str) -> bool {
        self.registry.has_template(&template_name(target, kind))
    }

    /// Render the snippet, or the placeholder when none exists
    pub fn render(&self, target: &str, kind: &str) -> String {
        let name = template_name(target, kind);
        if !self.registry.has_template(&name) {
            return placeholder(target, kind);
        }
        match self.registry.render(&name, &SnippetContext { target, kind }) {
            Ok(snippet) => snippet,
            Err(e) => {
                error!(target_name = target, kind, error = %e, "Failed to render validation snippet");
                placeholder(target, kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_pairs_render_code() {
        let renderer = SnippetRenderer::new().unwrap();
        let gin = renderer.render("gin", "middleware");
        assert!(gin.contains("gin.HandlerFunc"));
        assert!(gin.contains("\"target\":   \"gin\""));
        assert!(renderer.render("gin", "field").contains("func ValidateField"));
        assert!(renderer.render("chi", "middleware").contains("http.Handler"));
        assert!(renderer.render("fiber", "middleware").contains("fiber.Handler"));
    }

    #[test]
    fn test_unsupported_pair_returns_placeholder() {
        let renderer = SnippetRenderer::new().unwrap();
        assert!(!renderer.supports("echo", "field"));
        assert_eq!(
            renderer.render("echo", "field"),
            "// No template available for echo field\n"
        );
        assert_eq!(
            renderer.render("rocket", "middleware"),
            "// No template available for rocket middleware\n"
        );
    }
}
