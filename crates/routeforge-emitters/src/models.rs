//! In-memory generated projects

use std::fmt;
use std::path::{Path, PathBuf};

use routeforge_config::TargetKind;
use routeforge_patterns::HttpMethod;
use serde::{Deserialize, Serialize};

/// One generated file, path relative to the target directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// `(verb, path, operation)` of one emitted route, path in `{name}` form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteTriple {
    pub method: HttpMethod,
    pub path: String,
    pub operation: String,
}

impl fmt::Display for RouteTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.path, self.operation)
    }
}

/// A complete project for one target, not yet written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProject {
    pub target: TargetKind,
    /// Files in emission order
    pub files: Vec<GeneratedFile>,
    /// Routes the project registers, in route order
    pub triples: Vec<RouteTriple>,
}

impl GeneratedProject {
    /// Look up a file by its relative path
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    /// Relative paths of every file
    pub fn paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.path.as_path()).collect()
    }

    /// Total bytes of generated content
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }
}
