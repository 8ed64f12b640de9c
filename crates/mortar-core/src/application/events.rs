//! Lifecycle notifications and render results.

use std::sync::Mutex;

use crate::application::ports::EngineListener;
use crate::domain::{Frame, RenderError, Span};

/// Context carried by block notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub name: String,
    pub closing_names: Vec<String>,
    pub args: Vec<String>,
    /// Span of the opening marker.
    pub span: Span,
    /// Merged view of the scope when the notification fired.
    pub variables: Frame,
}

/// One recorded lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    BlockStarted(BlockInfo),
    BlockEnded(BlockInfo),
    Error(RenderError),
    Finished,
}

/// Listener that records every notification in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<EngineEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    fn record(&self, event: EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl EngineListener for EventLog {
    fn block_started(&self, info: &BlockInfo) {
        self.record(EngineEvent::BlockStarted(info.clone()));
    }

    fn block_ended(&self, info: &BlockInfo) {
        self.record(EngineEvent::BlockEnded(info.clone()));
    }

    fn finished(&self) {
        self.record(EngineEvent::Finished);
    }

    fn error_encountered(&self, error: &RenderError) {
        self.record(EngineEvent::Error(error.clone()));
    }
}

/// Outcome of one `process` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    /// Everything emitted, up to the halting point if processing halted.
    pub output: String,
    /// Every problem reported, in order.
    pub errors: Vec<RenderError>,
    /// True when a halting error stopped processing early.
    pub halted: bool,
}

impl Rendered {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error that halted processing, if any.
    pub fn halting_error(&self) -> Option<&RenderError> {
        self.errors.iter().find(|e| !e.continuing)
    }
}
