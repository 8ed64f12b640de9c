//! Template loaders.
//!
//! - [`FileLoader`] reads UTF-8 files, optionally relative to a root
//!   directory, and understands `file://` URLs.
//! - [`MemoryLoader`] serves templates from a name → text map.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tracing::{debug, instrument};

use mortar_core::{
    application::{ApplicationError, ports::TemplateLoader},
    error::{MortarError, MortarResult},
};

const FILE_SCHEME: &str = "file://";

// ── FileLoader ────────────────────────────────────────────────────────────────

/// Production loader backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl TemplateLoader for FileLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load_path(&self, path: &Path) -> MortarResult<String> {
        let full = self.resolve(path);
        let text = fs::read_to_string(&full).map_err(|e| map_io_error(&full, e))?;
        debug!(bytes = text.len(), "Read template file");
        Ok(text)
    }

    fn load_url(&self, url: &str) -> MortarResult<String> {
        let Some(rest) = url.strip_prefix(FILE_SCHEME) else {
            return Err(ApplicationError::UnsupportedScheme { url: url.into() }.into());
        };
        // `file://localhost/x` and `file:///x` both name `/x`.
        let path = rest.strip_prefix("localhost").unwrap_or(rest);
        self.load_path(Path::new(path))
    }
}

fn map_io_error(path: &Path, e: io::Error) -> MortarError {
    let location = path.display().to_string();
    match e.kind() {
        io::ErrorKind::NotFound => ApplicationError::TemplateNotFound { location },
        _ => ApplicationError::LoadFailed {
            location,
            reason: e.to_string(),
        },
    }
    .into()
}

// ── MemoryLoader ──────────────────────────────────────────────────────────────

/// In-memory loader for tests and embedded templates.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    templates: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&self, name: impl Into<String>, text: impl Into<String>) {
        if let Ok(mut templates) = self.templates.write() {
            templates.insert(name.into(), text.into());
        }
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.templates.write().ok()?.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.templates
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn get(&self, name: &str) -> MortarResult<String> {
        let templates = self.templates.read().map_err(|_| MortarError::Internal {
            message: "memory loader lock poisoned".into(),
        })?;
        templates.get(name).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                location: name.into(),
            }
            .into()
        })
    }
}

impl TemplateLoader for MemoryLoader {
    fn load_path(&self, path: &Path) -> MortarResult<String> {
        // Keys use forward slashes on every platform.
        self.get(&path.to_string_lossy().replace('\\', "/"))
    }

    fn load_url(&self, url: &str) -> MortarResult<String> {
        self.get(url)
    }
}
