//! Open-block stack.
//!
//! Each entry owns exactly one scope frame. Frames are pushed and popped in
//! lockstep with entries, so the scope never gets out of order relative to
//! the stack.

use std::sync::Arc;

use crate::application::ports::BlockHandler;
use crate::domain::{Frame, Scope, Span, Value};

/// One open block (or else-chain segment).
#[derive(Debug, Clone)]
pub struct OpenBlock {
    pub name: String,
    /// Non-empty.
    pub closing_names: Vec<String>,
    pub args: Vec<String>,
    /// Span of the opening marker.
    pub span: Span,
    /// First byte after the opening marker; where a repeat rewinds to.
    pub body_start: usize,
    pub handler: Arc<dyn BlockHandler>,
    /// Opened while output was disabled. Inert entries only track nesting;
    /// their handler hooks are never invoked.
    pub inert: bool,
    pub output_enabled: bool,
    pub state: Value,
}

impl OpenBlock {
    pub fn accepts(&self, closing_name: &str) -> bool {
        self.closing_names.iter().any(|n| n == closing_name)
    }
}

#[derive(Debug, Default)]
pub struct BlockStack {
    entries: Vec<OpenBlock>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an entry and its frame.
    ///
    /// An entry without closing names panics in debug builds. Release builds
    /// push it anyway; no end marker can close it, so it is reported as
    /// `UnclosedBlock` when the template ends.
    pub fn push(&mut self, entry: OpenBlock, frame: Frame, scope: &mut Scope<'_>) {
        debug_assert!(
            !entry.closing_names.is_empty(),
            "block '{}' pushed without closing names",
            entry.name
        );
        scope.push_frame(frame);
        self.entries.push(entry);
    }

    /// Pop the top entry and its frame.
    pub fn pop(&mut self, scope: &mut Scope<'_>) -> Option<OpenBlock> {
        let entry = self.entries.pop()?;
        scope.pop_frame();
        Some(entry)
    }

    pub fn top(&self) -> Option<&OpenBlock> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut OpenBlock> {
        self.entries.last_mut()
    }

    /// Whether the top entry accepts `closing_name`. Matching is exact.
    pub fn top_accepts(&self, closing_name: &str) -> bool {
        self.top().is_some_and(|top| top.accepts(closing_name))
    }

    /// Output is enabled only while every open entry has it enabled.
    pub fn output_enabled(&self) -> bool {
        self.entries.iter().all(|e| e.output_enabled)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
