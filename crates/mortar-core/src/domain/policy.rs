//! Error policy: which reported problems stop processing.

use serde::{Deserialize, Serialize};

use crate::domain::error::RenderErrorKind;

/// Which errors halt a `process` call.
///
/// The defaults keep going on cosmetic problems (a missing variable, an
/// unknown filter or block name) and stop on structural ones (mismatched
/// end markers, an unterminated literal region).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPolicy {
    /// Halt on `UnresolvedVariable`.
    pub strict_variables: bool,
    /// Halt on `UnknownBlockName`.
    pub strict_unknown_blocks: bool,
    /// Halt on structural errors. When false (lenient mode) only the
    /// offending marker is skipped.
    pub strict_structure: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            strict_variables: false,
            strict_unknown_blocks: false,
            strict_structure: true,
        }
    }
}

impl ErrorPolicy {
    /// Halt on every error kind.
    pub const fn strict() -> Self {
        Self {
            strict_variables: true,
            strict_unknown_blocks: true,
            strict_structure: true,
        }
    }

    /// Never halt; skip whatever is broken.
    pub const fn lenient() -> Self {
        Self {
            strict_variables: false,
            strict_unknown_blocks: false,
            strict_structure: false,
        }
    }

    /// Whether an error of `kind` halts processing under this policy.
    pub const fn halts_on(&self, kind: RenderErrorKind) -> bool {
        match kind {
            RenderErrorKind::UnresolvedVariable => self.strict_variables,
            RenderErrorKind::UnknownBlockName => self.strict_unknown_blocks,
            RenderErrorKind::UnmatchedBlockEnd | RenderErrorKind::UnterminatedLiteralEscape => {
                self.strict_structure
            }
            // Reported once processing has already reached the end.
            RenderErrorKind::UnclosedBlock => true,
            RenderErrorKind::UnknownFilterName | RenderErrorKind::MalformedMarkerArguments => false,
        }
    }
}
