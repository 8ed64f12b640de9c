//! Extension ports: block handlers and filters.
//!
//! The engine core knows nothing about loops, conditionals or string
//! transforms. It looks handlers and filters up by name and talks to them
//! through the small protocols below.

use std::fmt;

use thiserror::Error;

use crate::domain::{Frame, Scope, Span, Value};

/// Bad arguments given to a block handler or filter.
///
/// Reported by the engine as `MalformedMarkerArguments`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ArgumentError(pub String);

impl ArgumentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ── Block handlers ────────────────────────────────────────────────────────────

/// What a handler sees when a block (or inline marker) opens.
pub struct StartContext<'a, 's> {
    /// Marker name that opened the block (`for`, `if`, `else`, ...).
    pub name: &'a str,
    pub args: &'a [String],
    pub span: Span,
    pub scope: &'a Scope<'s>,
    /// State of the segment just closed, when this opening re-opens an
    /// else-chain (`else` after `if`). `None` for fresh blocks.
    pub previous: Option<&'a Value>,
}

impl StartContext<'_, '_> {
    /// Resolve an argument through the scope (literals included).
    pub fn resolve(&self, token: &str) -> Option<Value> {
        self.scope.resolve(token)
    }
}

/// A handler's answer to an opening marker.
///
/// For a block, `frame` becomes the block's own scope frame and `state` is
/// kept on the block entry for the end hook. For an inline marker, `frame`
/// is bound into the innermost scope frame and `state` is dropped. `output`
/// is written in both cases (if output is enabled).
#[derive(Debug, Clone, PartialEq)]
pub struct Opening {
    pub frame: Frame,
    pub state: Value,
    pub output_enabled: bool,
    pub output: Option<String>,
}

impl Default for Opening {
    fn default() -> Self {
        Self {
            frame: Frame::new(),
            state: Value::Null,
            output_enabled: true,
            output: None,
        }
    }
}

impl Opening {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.frame.insert(name.into(), value.into());
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_state(mut self, state: impl Into<Value>) -> Self {
        self.state = state.into();
        self
    }

    /// Suppress the block body while `enabled` is false.
    pub fn output_if(mut self, enabled: bool) -> Self {
        self.output_enabled = enabled;
        self
    }

    pub fn emit(mut self, text: impl Into<String>) -> Self {
        self.output = Some(text.into());
        self
    }
}

/// What a handler sees when a matching end marker closes its block.
pub struct EndContext<'a, 's> {
    /// Name the block (or current segment) was opened with.
    pub name: &'a str,
    pub args: &'a [String],
    /// Name of the end marker (`endfor`, `else`, ...).
    pub closing_name: &'a str,
    pub closing_args: &'a [String],
    /// The block's own frame.
    pub frame: &'a Frame,
    /// Handler state, as returned from `start` or updated by earlier ends.
    pub state: &'a mut Value,
    pub scope: &'a Scope<'s>,
}

/// Returned by [`BlockHandler::end`].
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Close the block and continue after the end marker.
    Close,
    /// Rewind to the first byte of the block body and run it again with
    /// `frame` replacing the block's frame.
    Repeat { frame: Frame },
}

/// A pluggable block (or inline marker) implementation.
///
/// # Termination
///
/// The engine does not bound repetition. A handler returning
/// [`Disposition::Repeat`] must eventually return [`Disposition::Close`].
pub trait BlockHandler: Send + Sync {
    /// Opening names this handler serves.
    fn names(&self) -> &[&str];

    /// Names accepted as closing a block opened with `name`.
    ///
    /// Empty means `name` is an inline marker that is never pushed. A
    /// closing name that itself has closing names (`else` → `endif`)
    /// re-opens a new segment under the same handler.
    fn closing_names(&self, name: &str) -> &[&str];

    /// Called when a block or inline marker opens.
    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError>;

    /// Called when a matching end marker is reached.
    fn end(&self, _ctx: &mut EndContext<'_, '_>) -> Disposition {
        Disposition::Close
    }

    /// One-line description for listings.
    fn describe(&self) -> &str {
        ""
    }
}

impl fmt::Debug for dyn BlockHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHandler")
            .field("names", &self.names())
            .finish()
    }
}

// ── Filters ──────────────────────────────────────────────────────────────────

/// A named, pure value transform.
///
/// Arguments arrive as plain strings with surrounding quotes removed; the
/// engine never evaluates markers inside them.
pub trait Filter: Send + Sync {
    /// Names (the first is canonical, the rest are aliases).
    fn names(&self) -> &[&str];

    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ArgumentError>;

    fn describe(&self) -> &str {
        ""
    }
}

/// Adapts a closure into a [`Filter`].
pub struct FnFilter<F> {
    names: [&'static str; 1],
    func: F,
}

impl<F> FnFilter<F>
where
    F: Fn(Value, &[String]) -> Result<Value, ArgumentError> + Send + Sync,
{
    pub fn new(name: &'static str, func: F) -> Self {
        Self {
            names: [name],
            func,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(Value, &[String]) -> Result<Value, ArgumentError> + Send + Sync,
{
    fn names(&self) -> &[&str] {
        &self.names
    }

    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ArgumentError> {
        (self.func)(value, args)
    }
}
