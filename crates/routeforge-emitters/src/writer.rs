//! Output writer for generated projects
//!
//! Writes a [`GeneratedProject`] under `<output_dir>/<target>/`. Files whose
//! on-disk content already matches are left untouched. Dry-run mode reports
//! what would be written without touching the filesystem. A failed write
//! aborts the project; files written before the failure stay on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EmitError, Result};
use crate::models::GeneratedProject;

/// Configuration for output writing
#[derive(Debug, Clone, Default)]
pub struct OutputWriterConfig {
    /// Preview only
    pub dry_run: bool,
}

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Written,
    Unchanged,
    WouldWrite,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Written => "Written",
            WriteAction::Unchanged => "Unchanged",
            WriteAction::WouldWrite => "Would write",
        }
    }
}

/// Result of writing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileWriteResult {
    pub path: PathBuf,
    pub action: WriteAction,
    pub bytes: usize,
}

/// Result of writing one project
#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    /// Directory the project was written to
    pub root: PathBuf,
    pub files: Vec<FileWriteResult>,
    pub files_written: usize,
    pub files_unchanged: usize,
    pub dry_run: bool,
}

/// Writes generated projects to disk
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    config: OutputWriterConfig,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputWriterConfig) -> Self {
        Self { config }
    }

    pub fn dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Directory a project lands in under `output_dir`
    pub fn project_root(output_dir: &Path, project: &GeneratedProject) -> PathBuf {
        output_dir.join(project.target.as_str())
    }

    /// Write every file of `project` under `output_dir/<target>/`
    pub fn write(&self, project: &GeneratedProject, output_dir: &Path) -> Result<WriteResult> {
        let root = Self::project_root(output_dir, project);
        let mut files = Vec::with_capacity(project.files.len());

        for file in &project.files {
            let path = root.join(&file.path);
            let action = if self.config.dry_run {
                WriteAction::WouldWrite
            } else {
                self.write_file(&path, &file.content)?
            };
            debug!(path = %path.display(), action = action.as_str(), "Processed file");
            files.push(FileWriteResult {
                path,
                action,
                bytes: file.content.len(),
            });
        }

        let files_written = files
            .iter()
            .filter(|f| f.action == WriteAction::Written)
            .count();
        let files_unchanged = files
            .iter()
            .filter(|f| f.action == WriteAction::Unchanged)
            .count();

        info!(
            target_name = %project.target,
            root = %root.display(),
            written = files_written,
            unchanged = files_unchanged,
            dry_run = self.config.dry_run,
            "Wrote target project"
        );

        Ok(WriteResult {
            root,
            files,
            files_written,
            files_unchanged,
            dry_run: self.config.dry_run,
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<WriteAction> {
        if let Ok(existing) = fs::read_to_string(path) {
            if existing == content {
                return Ok(WriteAction::Unchanged);
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EmitError::WriteFailed(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            EmitError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(WriteAction::Written)
    }
}
