//! Analysis export and text summary

use std::collections::BTreeMap;
use std::fmt::Write;

use routeforge_routes::RouteSpec;
use routeforge_scanner::{PackageModel, ProjectModel};
use serde::Serialize;

use crate::error::Result;

/// File name of the analysis export inside the output directory
pub const ANALYSIS_FILE: &str = "api-analysis.json";

const RULE_WIDTH: usize = 50;

#[derive(Debug, Serialize)]
struct Analysis<'a> {
    packages: &'a BTreeMap<String, PackageModel>,
    routes: &'a [RouteSpec],
    summary: AnalysisSummary,
}

/// Counts included in the analysis export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub package_count: usize,
    pub type_count: usize,
    pub function_count: usize,
    pub route_count: usize,
    pub auto_generated_routes: usize,
    pub protected_routes: usize,
}

impl AnalysisSummary {
    pub fn of(model: &ProjectModel, routes: &[RouteSpec]) -> Self {
        Self {
            package_count: model.packages.len(),
            type_count: model.type_count(),
            function_count: model.function_count(),
            route_count: routes.len(),
            auto_generated_routes: routes.iter().filter(|r| r.auto_generated()).count(),
            protected_routes: routes.iter().filter(|r| r.auth.required).count(),
        }
    }
}

/// `{packages, routes, summary}` as pretty JSON
pub fn analysis_json(model: &ProjectModel, routes: &[RouteSpec]) -> Result<String> {
    let analysis = Analysis {
        packages: &model.packages,
        routes,
        summary: AnalysisSummary::of(model, routes),
    };
    Ok(serde_json::to_string_pretty(&analysis)?)
}

/// Short human-readable table of packages and routes
pub fn summary(model: &ProjectModel, routes: &[RouteSpec]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Scan results");
    let _ = writeln!(out, "{}", rule);

    for package in model.packages() {
        let _ = writeln!(out, "\nPackage {} ({})", package.name, package.key);
        let _ = writeln!(
            out,
            "  types: {}, functions: {}, imports: {}",
            package.types.len(),
            package.functions.len(),
            package.imports.len()
        );
        for ty in &package.types {
            let _ = writeln!(
                out,
                "    {} ({} fields, {} methods, {} annotations)",
                ty.name,
                ty.fields.len(),
                ty.methods.len(),
                ty.annotations.len()
            );
        }
    }

    let _ = writeln!(out, "\nRoutes: {}", routes.len());
    let method_width = routes
        .iter()
        .map(|r| r.method.as_str().len())
        .max()
        .unwrap_or(0);
    let path_width = routes.iter().map(|r| r.path.len()).max().unwrap_or(0);
    for route in routes {
        let label = if route.function.is_empty() {
            &route.handler_name
        } else {
            &route.function
        };
        let access = if route.auth.required {
            "auth required"
        } else {
            "public"
        };
        let _ = writeln!(
            out,
            "  {:<mw$}  {:<pw$}  {} [{}, {}]",
            route.method.as_str(),
            route.path,
            label,
            route.source,
            access,
            mw = method_width,
            pw = path_width
        );
    }
    let _ = writeln!(out, "{}", rule);
    out
}
