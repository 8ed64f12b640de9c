//! Directory rendering.
//!
//! Walks a source tree, renders every file ending in the template
//! extension (dropping that extension) and copies everything else
//! verbatim. Relative layout is preserved under the destination.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use mortar_core::{
    application::{ApplicationError, Engine},
    domain::{Frame, RenderError},
    error::{MortarError, MortarResult},
};

/// What happened to one file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Rendered {
        errors: Vec<RenderError>,
        halted: bool,
    },
    Copied,
}

/// One walked file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Path relative to the source root.
    pub source: PathBuf,
    /// Path relative to the destination root.
    pub target: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn errors(&self) -> &[RenderError] {
        match &self.outcome {
            FileOutcome::Rendered { errors, .. } => errors,
            FileOutcome::Copied => &[],
        }
    }

    pub fn halted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Rendered { halted: true, .. })
    }
}

/// Per-file results of [`render_tree`], in walk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeReport {
    pub files: Vec<FileReport>,
}

impl TreeReport {
    pub fn rendered(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Rendered { .. }))
            .count()
    }

    pub fn copied(&self) -> usize {
        self.files.len() - self.rendered()
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors().len()).sum()
    }

    /// Whether any file stopped on a halting error, including unclosed blocks.
    pub fn any_halted(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.halted() || f.errors().iter().any(|e| !e.continuing))
    }
}

/// Render `src` into `dst`.
///
/// Files named `*.{extension}` are processed with the engine's persistent
/// values as globals; each gets a fresh, empty variable frame. A file whose
/// render halts still has its partial output written.
#[instrument(skip(engine), fields(src = %src.display(), dst = %dst.display()))]
pub fn render_tree(
    engine: &mut Engine,
    src: &Path,
    dst: &Path,
    extension: &str,
) -> MortarResult<TreeReport> {
    if !src.is_dir() {
        return Err(ApplicationError::TemplateNotFound {
            location: src.display().to_string(),
        }
        .into());
    }
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    fs::create_dir_all(dst).map_err(|e| write_error(dst, e))?;

    let mut report = TreeReport::default();
    let walker = WalkDir::new(src).min_depth(1).sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| ApplicationError::LoadFailed {
            location: e
                .path()
                .map_or_else(|| src.display().to_string(), |p| p.display().to_string()),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        let relative = path.strip_prefix(src).map_err(|e| MortarError::Internal {
            message: format!("walked outside {}: {e}", src.display()),
        })?;

        if entry.file_type().is_dir() {
            fs::create_dir_all(dst.join(relative)).map_err(|e| write_error(relative, e))?;
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let stem = file_name
            .strip_suffix(suffix.as_str())
            .filter(|stem| !stem.is_empty());

        let file = match stem {
            Some(stem) => {
                let target = relative.with_file_name(stem);
                render_file(engine, path, relative, &target, dst)?
            }
            None => {
                let target = dst.join(relative);
                fs::copy(path, &target).map_err(|e| write_error(&target, e))?;
                debug!(file = %relative.display(), "Copied");
                FileReport {
                    source: relative.to_path_buf(),
                    target: relative.to_path_buf(),
                    outcome: FileOutcome::Copied,
                }
            }
        };
        report.files.push(file);
    }

    info!(
        rendered = report.rendered(),
        copied = report.copied(),
        errors = report.error_count(),
        "Tree rendered"
    );
    Ok(report)
}

fn render_file(
    engine: &mut Engine,
    path: &Path,
    relative: &Path,
    target: &Path,
    dst: &Path,
) -> MortarResult<FileReport> {
    let template = fs::read_to_string(path).map_err(|e| ApplicationError::LoadFailed {
        location: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let rendered = engine.process(&template, Frame::new())?;

    let out = dst.join(target);
    fs::write(&out, &rendered.output).map_err(|e| write_error(&out, e))?;

    if rendered.is_clean() {
        debug!(file = %relative.display(), "Rendered");
    } else {
        warn!(
            file = %relative.display(),
            errors = rendered.errors.len(),
            halted = rendered.halted,
            "Rendered with errors"
        );
    }

    Ok(FileReport {
        source: relative.to_path_buf(),
        target: target.to_path_buf(),
        outcome: FileOutcome::Rendered {
            errors: rendered.errors,
            halted: rendered.halted,
        },
    })
}

fn write_error(path: &Path, e: io::Error) -> MortarError {
    ApplicationError::WriteFailed {
        location: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}
