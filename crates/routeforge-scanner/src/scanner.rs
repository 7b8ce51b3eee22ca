//! Source tree walk, parallel unit parsing and sequential package merge

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use routeforge_config::GeneratorConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    error::{Result, ScanError},
    go::GoUnitParser,
    merge::{associate_methods, merge_unit, MergeNote},
    model::{PackageModel, ProjectModel},
};

/// A unit that matched the filters but could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub units_matched: usize,
    pub units_parsed: usize,
    pub skipped: Vec<SkippedUnit>,
    pub merge_notes: Vec<MergeNote>,
}

/// Model plus report
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub model: ProjectModel,
    pub report: ScanReport,
}

/// Walks a source tree and builds a [`ProjectModel`]
#[derive(Debug, Clone)]
pub struct SourceScanner {
    include: GlobSet,
    exclude: GlobSet,
    include_empty: bool,
    parser: GoUnitParser,
}

impl SourceScanner {
    /// Build a scanner from generator settings
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            include: build_globset(&config.include_patterns)?,
            exclude: build_globset(&config.exclude_patterns)?,
            include_empty: config.include_patterns.is_empty(),
            parser: GoUnitParser::new(config.scan_annotations),
        })
    }

    /// Collect candidate units under `root` in walk order
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut units = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_pruned(root, entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("go") {
                continue;
            }
            let rel = relative(root, path);
            let name = entry.file_name().to_string_lossy();
            if self.exclude.is_match(&rel) || self.exclude.is_match(&*name) {
                debug!(path = %rel, "Unit excluded");
                continue;
            }
            if self.include_empty
                || self.include.is_match(&rel)
                || self.include.is_match(&*name)
            {
                units.push(path.to_path_buf());
            }
        }

        Ok(units)
    }

    /// Scan `root` into a project model.
    ///
    /// Units that fail to parse are skipped and reported; the scan only fails
    /// when units matched and none of them parsed.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome> {
        info!(root = %root.display(), "Scan started");
        let units = self.discover(root)?;
        let mut report = ScanReport {
            units_matched: units.len(),
            ..Default::default()
        };

        let parsed: Vec<_> = units
            .par_iter()
            .map(|path| (path.clone(), self.parser.parse_file(path)))
            .collect();

        let mut packages: BTreeMap<String, PackageModel> = BTreeMap::new();
        for (path, result) in parsed {
            let unit = match result {
                Ok(unit) => unit,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unparsable unit");
                    report.skipped.push(SkippedUnit {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let key = package_key(root, &path);
            debug!(path = %path.display(), package = %key, "Unit parsed");
            let package = packages.entry(key.clone()).or_insert_with(|| PackageModel {
                import_path: import_path(&key),
                key,
                ..Default::default()
            });
            merge_unit(package, unit, &path, &mut report.merge_notes);
            report.units_parsed += 1;
        }

        if report.units_matched > 0 && report.units_parsed == 0 {
            return Err(ScanError::NoParsableUnits {
                matched: report.units_matched,
            });
        }

        for package in packages.values_mut() {
            associate_methods(package);
        }

        let model = ProjectModel {
            root: root.to_path_buf(),
            packages,
        };
        info!(
            packages = model.packages.len(),
            types = model.type_count(),
            parsed = report.units_parsed,
            skipped = report.skipped.len(),
            "Scan completed"
        );

        Ok(ScanOutcome { model, report })
    }

    fn is_pruned(&self, root: &Path, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let rel = relative(root, entry.path());
        let name = entry.file_name().to_string_lossy();
        let pruned = self.exclude.is_match(&rel)
            || self.exclude.is_match(format!("{}/", rel))
            || self.exclude.is_match(&*name);
        if pruned {
            debug!(path = %rel, "Directory pruned");
        }
        pruned
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanError::InvalidPattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}

fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn package_key(root: &Path, unit: &Path) -> String {
    let dir = unit.parent().map(|p| relative(root, p)).unwrap_or_default();
    if dir.is_empty() {
        ".".to_string()
    } else {
        dir
    }
}

fn import_path(key: &str) -> String {
    if key == "." {
        return String::new();
    }
    key.strip_prefix("src/").unwrap_or(key).to_string()
}
