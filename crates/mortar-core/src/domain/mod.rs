// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Mortar.
//!
//! This module contains the pure data model of the engine: values, markers,
//! delimiter configuration, scope frames, and error kinds.
//!
//! ## Rules
//!
//! - **No I/O**: templates arrive as `&str`, variables as [`Frame`]s
//! - **No engine state**: everything here is a plain value type
//! - **No external crates**: only std, `serde` for values/config, `thiserror`
//!
// Public API - what the world sees
pub mod delimiters;
pub mod error;
pub mod marker;
pub mod policy;
pub mod scope;
pub mod value;

// Re-exports for convenience
pub use delimiters::Delimiters;
pub use error::{DomainError, ErrorCategory, RenderError, RenderErrorKind};
pub use marker::{FilterSpec, MalformedMarker, Marker, MarkerKind, ScanResult, Span};
pub use policy::ErrorPolicy;
pub use scope::{Frame, Scope, parse_literal, unquote};
pub use value::Value;

/// Build a [`Frame`] from `(name, value)` pairs.
///
/// ```
/// use mortar_core::domain::{frame, Value};
///
/// let vars = frame([("name", Value::from("World"))]);
/// assert_eq!(vars["name"], Value::from("World"));
/// ```
pub fn frame<K, V, I>(pairs: I) -> Frame
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Cross-module behaviour
    // ========================================================================

    #[test]
    fn frame_helper_converts_values() {
        let vars = frame([("a", 1), ("b", 2)]);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["b"], Value::Integer(2));
    }

    #[test]
    fn scope_over_frame_helper() {
        let globals = frame([("site", "mortar")]);
        let scope = Scope::new(&globals, frame([("page", "home")]));

        assert_eq!(scope.resolve("site"), Some(Value::from("mortar")));
        assert_eq!(scope.resolve("page"), Some(Value::from("home")));
        assert_eq!(scope.flatten().len(), 2);
    }

    #[test]
    fn quoted_marker_argument_round_trip() {
        assert_eq!(unquote("\"a b\""), Some("a b"));
        assert_eq!(unquote("\"unterminated"), None);
        assert_eq!(parse_literal("'q'"), Some(Value::from("q")));
    }
}
