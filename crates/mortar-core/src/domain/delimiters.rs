//! Delimiter configuration consumed by marker scanners.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// The engine's configurable syntax.
///
/// Every field is independently settable. Scanners receive the current
/// value through `MarkerScanner::configuration_changed` at the start of
/// each `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    pub marker_start: String,
    pub marker_end: String,
    pub expression_start: String,
    pub expression_end: String,
    /// Separates an expression from its filters.
    pub filter_delimiter: String,
    /// Tag name that opens a literal region.
    pub literal_start: String,
    /// Tag name that closes a literal region.
    pub literal_end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            marker_start: "{%".into(),
            marker_end: "%}".into(),
            expression_start: "{{".into(),
            expression_end: "}}".into(),
            filter_delimiter: "|".into(),
            literal_start: "literal".into(),
            literal_end: "/literal".into(),
        }
    }
}

impl Delimiters {
    /// Reject configurations no scanner can work with.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields: [(&'static str, &str); 7] = [
            ("marker_start", &self.marker_start),
            ("marker_end", &self.marker_end),
            ("expression_start", &self.expression_start),
            ("expression_end", &self.expression_end),
            ("filter_delimiter", &self.filter_delimiter),
            ("literal_start", &self.literal_start),
            ("literal_end", &self.literal_end),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::EmptyDelimiter { field });
            }
        }

        if self.marker_start == self.expression_start {
            return Err(DomainError::ConflictingDelimiters {
                reason: format!(
                    "marker and expression both start with '{}'",
                    self.marker_start
                ),
            });
        }
        if self.literal_start == self.literal_end {
            return Err(DomainError::ConflictingDelimiters {
                reason: format!(
                    "literal start and end markers are both '{}'",
                    self.literal_start
                ),
            });
        }
        if self.literal_start.contains(char::is_whitespace)
            || self.literal_end.contains(char::is_whitespace)
        {
            return Err(DomainError::ConflictingDelimiters {
                reason: "literal markers must be single words".into(),
            });
        }

        Ok(())
    }
}
