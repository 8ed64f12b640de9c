// ============================================================================
// domain/error.rs - DOMAIN AND RENDER ERRORS
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::domain::marker::Span;

/// Root domain error type.
///
/// These are *configuration* and *usage* errors: bad delimiters, a block
/// handler that declares no names, and so on. Problems in template content
/// are never `DomainError`s; they are reported as [`RenderError`]s.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Delimiter '{field}' must not be empty")]
    EmptyDelimiter { field: &'static str },

    #[error("Delimiters conflict: {reason}")]
    ConflictingDelimiters { reason: String },

    // ========================================================================
    // Registration Errors
    // ========================================================================
    #[error("Block handler registers no names")]
    NamelessBlockHandler,

    #[error("Block name '{name}' is already registered")]
    DuplicateBlockName { name: String },

    #[error("Block name '{name}' conflicts with the literal marker")]
    ReservedBlockName { name: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyDelimiter { field } => vec![
                format!("Give '{}' a non-empty value", field),
                "Defaults: {% %} for markers, {{ }} for expressions".into(),
            ],
            Self::ConflictingDelimiters { reason } => vec![
                format!("Details: {}", reason),
                "Marker and expression delimiters must be distinguishable".into(),
            ],
            Self::DuplicateBlockName { name } => vec![
                format!("'{}' is handled by another block handler", name),
                "Remove one of the handlers or rename the block".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyDelimiter { .. } | Self::ConflictingDelimiters { .. } => {
                ErrorCategory::Configuration
            }
            Self::NamelessBlockHandler
            | Self::DuplicateBlockName { .. }
            | Self::ReservedBlockName { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
}

// ============================================================================
// Render errors - reported, never returned
// ============================================================================

/// Kinds of problems found while processing template content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderErrorKind {
    UnknownBlockName,
    UnknownFilterName,
    UnresolvedVariable,
    /// A closing marker that is not accepted by the innermost open block.
    UnmatchedBlockEnd,
    UnterminatedLiteralEscape,
    MalformedMarkerArguments,
    /// End of template reached with a block still open.
    UnclosedBlock,
}

impl RenderErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownBlockName => "unknown-block-name",
            Self::UnknownFilterName => "unknown-filter-name",
            Self::UnresolvedVariable => "unresolved-variable",
            Self::UnmatchedBlockEnd => "unmatched-block-end",
            Self::UnterminatedLiteralEscape => "unterminated-literal-escape",
            Self::MalformedMarkerArguments => "malformed-marker-arguments",
            Self::UnclosedBlock => "unclosed-block",
        }
    }

    /// Structural errors break the block structure of the template and halt
    /// processing unless the engine runs in lenient mode.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedBlockEnd | Self::UnterminatedLiteralEscape | Self::UnclosedBlock
        )
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownBlockName => vec![
                "Check the spelling of the block name".into(),
                "Run `mortar list` to see the registered blocks".into(),
            ],
            Self::UnknownFilterName => vec![
                "Check the spelling of the filter name".into(),
                "Run `mortar list` to see the registered filters".into(),
            ],
            Self::UnresolvedVariable => vec![
                "Pass the variable with --set name=value or a --vars file".into(),
                "Or guard it with a `default` filter".into(),
            ],
            Self::UnmatchedBlockEnd => vec![
                "Closing markers must close the innermost open block".into(),
                "Check for a missing or misspelled end marker".into(),
            ],
            Self::UnterminatedLiteralEscape => {
                vec!["Add the literal end marker (default: {% /literal %})".into()]
            }
            Self::MalformedMarkerArguments => {
                vec!["Check the marker's arguments against its documented syntax".into()]
            }
            Self::UnclosedBlock => vec!["Add the missing end marker".into()],
        }
    }
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem reported while processing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub message: String,
    /// Span of the offending marker, or of the unconsumed remainder.
    pub span: Span,
    /// Whether processing carried on after this error.
    pub continuing: bool,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            continuing: true,
        }
    }

    pub fn halting(mut self) -> Self {
        self.continuing = false;
        self
    }
}
