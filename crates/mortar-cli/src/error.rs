//! Error handling for the Mortar CLI.
//!
//! Every command returns [`CliResult`]. `main` turns a [`CliError`] into a
//! message on stderr and an exit code:
//!
//! | Category      | Code |
//! |---------------|------|
//! | Internal      |  1   |
//! | User error    |  2   |
//! | Not found     |  3   |
//! | Configuration |  4   |
//! | Render halted |  5   |

use std::path::PathBuf;
use std::{error::Error, fmt::Write as _};

use owo_colors::OwoColorize;
use thiserror::Error;

use mortar_core::error::MortarError;

pub use mortar_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    /// A `--set` argument that is not `name=value`.
    #[error("Invalid assignment '{assignment}'")]
    InvalidAssignment { assignment: String },

    /// A `--vars` document could not be read as a variable map.
    #[error("Cannot read variables from {path}: {reason}")]
    InvalidVarsFile { path: PathBuf, reason: String },

    /// Processing stopped at a halting error.
    #[error("Rendering {template} halted: {reason}")]
    RenderHalted { template: String, reason: String },

    /// `check` found problems that did not halt processing.
    #[error("{template} has {count} template error(s)")]
    TemplateErrors { template: String, count: usize },

    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    /// An error from the engine or its adapters.
    #[error("{0}")]
    Core(#[from] MortarError),

    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// User-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::InvalidAssignment { .. } => vec![
                "Assignments look like --set name=value".into(),
                "Values are parsed as literals: 42, 1.5, true, null, \"text\"".into(),
                "Anything else is taken as a plain string".into(),
            ],

            Self::InvalidVarsFile { path, .. } => vec![
                format!("Check the syntax of {}", path.display()),
                "Variable files are JSON (.json) or TOML (.toml) tables".into(),
            ],

            Self::RenderHalted { .. } => vec![
                "Fix the marker reported above and re-run".into(),
                "Use --lenient to skip broken markers instead of stopping".into(),
                "Use --events to trace block starts and ends".into(),
            ],

            Self::TemplateErrors { .. } => vec![
                "Each problem is listed above with its byte range".into(),
                "Use 'mortar list' to see the available blocks and filters".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Show the active configuration file: mortar config path".into(),
                "Create a default configuration: mortar init".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. }
            | Self::InvalidAssignment { .. }
            | Self::InvalidVarsFile { .. }
            | Self::TemplateErrors { .. } => ErrorCategory::UserError,
            Self::RenderHalted { .. } => ErrorCategory::RenderHalted,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::RenderHalted => 5,
        }
    }

    /// Format the error with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        let _ = write!(
            output,
            "\n{} {}\n\n",
            "\u{2717}".red().bold(),
            "Error:".red().bold()
        );
        let _ = writeln!(output, "  {}", self.to_string().red());

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                let _ = writeln!(
                    output,
                    "\n  {} {}",
                    "\u{2192}".dimmed(),
                    err.to_string().dimmed()
                );
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(output, "\n{}", "Suggestions:".yellow().bold());
            for suggestion in suggestions {
                let _ = writeln!(output, "  {}", suggestion);
            }
        }

        if !verbose {
            let _ = writeln!(
                output,
                "\n{} {}",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            );
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`].
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nError: {}", self);

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                let _ = writeln!(out, "  Caused by: {err}");
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                let _ = writeln!(out, "  {s}");
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::RenderHalted => tracing::warn!("Render halted: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    /// A template reported a halting error.
    RenderHalted,
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Attach a context message to an I/O failure at the call-site.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_core::application::ApplicationError;
    use std::io;

    #[test]
    fn assignment_suggestions_show_syntax() {
        let err = CliError::InvalidAssignment {
            assignment: "oops".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--set name=value")));
    }

    #[test]
    fn halted_render_suggests_lenient() {
        let err = CliError::RenderHalted {
            template: "page.tmpl".into(),
            reason: "unmatched-block-end".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--lenient")));
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn exit_code_user_error() {
        assert_eq!(
            CliError::InvalidInput {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            2
        );
        assert_eq!(
            CliError::TemplateErrors {
                template: "t".into(),
                count: 1
            }
            .exit_code(),
            2
        );
    }

    #[test]
    fn exit_code_not_found() {
        let core: CliError = MortarError::from(ApplicationError::TemplateNotFound {
            location: "x".into(),
        })
        .into();
        assert_eq!(core.exit_code(), 3);
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn exit_code_render_halted() {
        assert_eq!(
            CliError::RenderHalted {
                template: "t".into(),
                reason: "r".into()
            }
            .exit_code(),
            5
        );
    }

    #[test]
    fn exit_code_internal() {
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            1
        );
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let err = CliError::InvalidVarsFile {
            path: PathBuf::from("/tmp/x.json"),
            reason: "expected a table".into(),
        };
        let s = err.format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause() {
        let err = CliError::IoError {
            message: "writing output".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading vars");
        assert!(matches!(cli, Err(CliError::IoError { message, .. }) if message == "reading vars"));
    }
}
