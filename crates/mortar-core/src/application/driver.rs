//! The scan loop behind [`Engine::process`].
//!
//! One [`Run`] exists per call. It owns the cursor, the output buffer, the
//! block stack and the scope, and borrows everything else from the engine.
//!
//! Every iteration either moves the cursor strictly forward or rewinds it
//! to the body start of a block whose handler asked for a repeat.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::application::block_stack::{BlockStack, OpenBlock};
use crate::application::engine::Engine;
use crate::application::events::{BlockInfo, Rendered};
use crate::application::filter_pipeline::FilterFailure;
use crate::application::ports::{BlockHandler, Disposition, EndContext, StartContext};
use crate::domain::{
    Frame, MalformedMarker, Marker, MarkerKind, RenderError, RenderErrorKind, ScanResult, Scope,
    Span, Value,
};

/// How a tag or expression marker is routed.
enum Dispatch {
    Expression,
    LiteralStart,
    /// Accepted by the top open block.
    BlockEnd,
    BlockStart(Arc<dyn BlockHandler>),
    /// A closing name that the top open block does not accept.
    StrayEnd,
    Unknown,
}

#[derive(Clone, Copy)]
enum Notification {
    Started,
    Ended,
}

pub(crate) struct Run<'e, 't> {
    engine: &'e Engine,
    template: &'t str,
    cursor: usize,
    output: String,
    errors: Vec<RenderError>,
    halted: bool,
    scope: Scope<'e>,
    stack: BlockStack,
}

impl<'e, 't> Run<'e, 't> {
    pub(crate) fn new(engine: &'e Engine, template: &'t str, variables: Frame) -> Self {
        Self {
            engine,
            template,
            cursor: 0,
            output: String::with_capacity(template.len()),
            errors: Vec::new(),
            halted: false,
            scope: Scope::new(engine.persistent(), variables),
            stack: BlockStack::new(),
        }
    }

    pub(crate) fn execute(mut self) -> Rendered {
        while !self.halted {
            let Some(found) = self.scan(self.cursor) else {
                self.emit_text(self.cursor, self.template.len());
                self.cursor = self.template.len();
                break;
            };

            match found {
                Ok(marker) => {
                    self.emit_text(self.cursor, marker.span.start);
                    self.dispatch(&marker);
                }
                Err(malformed) => {
                    self.emit_text(self.cursor, malformed.span.start);
                    self.malformed(malformed);
                }
            }
        }

        if !self.halted {
            self.close_unclosed();
        }
        for listener in self.engine.listeners() {
            listener.finished();
        }

        Rendered {
            output: self.output,
            errors: self.errors,
            halted: self.halted,
        }
    }

    /// Ask the scanner for the next marker at or after `from`.
    ///
    /// A result that starts before `from`, is empty, or does not lie on
    /// character boundaries inside the template is treated as "no more
    /// markers" so a misbehaving scanner cannot stall the loop.
    fn scan(&self, from: usize) -> Option<ScanResult> {
        let found = self.engine.scanner().next_marker(self.template, from)?;
        let span = match &found {
            Ok(marker) => marker.span,
            Err(malformed) => malformed.span,
        };

        if !self.in_bounds(span, from) {
            warn!(%span, from, "Scanner returned an invalid span; treating the rest as text");
            return None;
        }
        Some(found)
    }

    fn in_bounds(&self, span: Span, from: usize) -> bool {
        span.start >= from
            && span.end > span.start
            && span.end <= self.template.len()
            && self.template.is_char_boundary(span.start)
            && self.template.is_char_boundary(span.end)
    }

    fn dispatch(&mut self, marker: &Marker) {
        match self.classify(marker) {
            Dispatch::Expression => self.expression(marker),
            Dispatch::LiteralStart => self.literal(marker),
            Dispatch::BlockEnd => self.block_end(marker),
            Dispatch::BlockStart(handler) => self.block_start(marker, handler),
            Dispatch::StrayEnd => self.unmatched_end(marker),
            Dispatch::Unknown => self.unknown_block(marker),
        }
    }

    /// Closing the top block takes precedence over opening a new one, so a
    /// name that both closes and opens (`else`) closes first.
    fn classify(&self, marker: &Marker) -> Dispatch {
        if marker.kind == MarkerKind::Expression {
            return Dispatch::Expression;
        }

        let delimiters = self.engine.delimiters();
        if marker.name == delimiters.literal_start {
            Dispatch::LiteralStart
        } else if self.stack.top_accepts(&marker.name) {
            Dispatch::BlockEnd
        } else if let Some(handler) = self.engine.blocks().get(&marker.name) {
            Dispatch::BlockStart(Arc::clone(handler))
        } else if marker.name == delimiters.literal_end
            || self.engine.blocks().is_closing_name(&marker.name)
        {
            Dispatch::StrayEnd
        } else {
            Dispatch::Unknown
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn expression(&mut self, marker: &Marker) {
        self.cursor = marker.span.end;
        if !self.stack.output_enabled() {
            return;
        }

        let value = match self.scope.resolve(&marker.name) {
            Some(value) => value,
            None => {
                let error = RenderError::new(
                    RenderErrorKind::UnresolvedVariable,
                    format!("'{}' is not defined", marker.name),
                    marker.span,
                );
                if self.engine.policy().strict_variables {
                    self.halt(error);
                    return;
                }
                self.report(error);
                Value::Null
            }
        };

        let value = self.apply_filters(value, marker);
        self.output.push_str(&value.to_string());
    }

    fn apply_filters(&mut self, value: Value, marker: &Marker) -> Value {
        if marker.filters.is_empty() {
            return value;
        }

        let (value, failures) = self.engine.filters().apply_chain(value, &marker.filters);
        for failure in failures {
            let error = match failure {
                FilterFailure::Unknown { name } => RenderError::new(
                    RenderErrorKind::UnknownFilterName,
                    format!("no filter named '{name}'"),
                    marker.span,
                ),
                FilterFailure::Rejected { name, error } => RenderError::new(
                    RenderErrorKind::MalformedMarkerArguments,
                    format!("filter '{name}': {error}"),
                    marker.span,
                ),
            };
            self.report(error);
        }
        value
    }

    // ── Literal regions ───────────────────────────────────────────────────────

    /// Copy everything up to the literal end tag verbatim. Only the end tag
    /// is searched for; other delimiters inside the region are plain text.
    fn literal(&mut self, marker: &Marker) {
        let engine = self.engine;
        let delimiters = engine.delimiters();
        let literal_end = delimiters.literal_end.as_str();
        let body_start = marker.span.end;

        let end = engine
            .scanner()
            .find_literal_end(self.template, body_start, delimiters)
            .filter(|span| self.in_bounds(*span, body_start));
        if let Some(end) = end {
            self.emit_text(body_start, end.start);
            self.cursor = end.end;
            return;
        }

        let error = RenderError::new(
            RenderErrorKind::UnterminatedLiteralEscape,
            format!("'{}' has no matching '{literal_end}'", marker.name),
            Span::new(marker.span.start, self.template.len()),
        );
        if engine.policy().strict_structure {
            self.emit_text(body_start, self.template.len());
            self.cursor = self.template.len();
            self.halt(error);
        } else {
            self.report(error);
            self.cursor = marker.span.end;
        }
    }

    // ── Blocks ────────────────────────────────────────────────────────────────

    fn block_start(&mut self, marker: &Marker, handler: Arc<dyn BlockHandler>) {
        self.cursor = marker.span.end;
        let closing = closing_names(handler.as_ref(), &marker.name);

        if !self.stack.output_enabled() {
            // Track nesting only. Inline markers leave no trace.
            if !closing.is_empty() {
                self.push_inert(marker, handler, closing);
            }
            return;
        }
        self.open(marker, handler, closing, None);
    }

    /// Run a handler's start hook and push the block, or apply an inline
    /// marker. Shared by fresh blocks and else-chain segments.
    fn open(
        &mut self,
        marker: &Marker,
        handler: Arc<dyn BlockHandler>,
        closing: Vec<String>,
        previous: Option<Value>,
    ) {
        let ctx = StartContext {
            name: &marker.name,
            args: &marker.args,
            span: marker.span,
            scope: &self.scope,
            previous: previous.as_ref(),
        };
        let opening = match handler.start(&ctx) {
            Ok(opening) => opening,
            Err(err) => {
                self.report(RenderError::new(
                    RenderErrorKind::MalformedMarkerArguments,
                    format!("'{}': {err}", marker.name),
                    marker.span,
                ));
                // Skip the body but keep the end marker balanced.
                if !closing.is_empty() {
                    self.push_inert(marker, handler, closing);
                }
                return;
            }
        };

        if let Some(text) = &opening.output {
            self.output.push_str(text);
        }

        if closing.is_empty() {
            trace!(marker = %marker.name, bindings = opening.frame.len(), "Inline marker applied");
            for (name, value) in opening.frame {
                self.scope.bind(name, value);
            }
            return;
        }

        let entry = OpenBlock {
            name: marker.name.clone(),
            closing_names: closing,
            args: marker.args.clone(),
            span: marker.span,
            body_start: marker.span.end,
            handler,
            inert: false,
            output_enabled: opening.output_enabled,
            state: opening.state,
        };
        debug!(
            block = %entry.name,
            depth = self.stack.depth() + 1,
            output_enabled = entry.output_enabled,
            "Block opened"
        );
        self.stack.push(entry, opening.frame, &mut self.scope);
        self.notify(Notification::Started);
    }

    fn push_inert(&mut self, marker: &Marker, handler: Arc<dyn BlockHandler>, closing: Vec<String>) {
        let entry = OpenBlock {
            name: marker.name.clone(),
            closing_names: closing,
            args: marker.args.clone(),
            span: marker.span,
            body_start: marker.span.end,
            handler,
            inert: true,
            output_enabled: false,
            state: Value::Null,
        };
        trace!(block = %entry.name, "Inert block pushed");
        self.stack.push(entry, Frame::new(), &mut self.scope);
    }

    fn block_end(&mut self, marker: &Marker) {
        self.cursor = marker.span.end;
        let Some(top) = self.stack.top_mut() else {
            return;
        };
        let handler = Arc::clone(&top.handler);
        let body_start = top.body_start;

        if top.inert {
            self.stack.pop(&mut self.scope);
            let next = closing_names(handler.as_ref(), &marker.name);
            if !next.is_empty() {
                self.push_inert(marker, handler, next);
            }
            return;
        }

        let mut ctx = EndContext {
            name: &top.name,
            args: &top.args,
            closing_name: &marker.name,
            closing_args: &marker.args,
            frame: self.scope.innermost(),
            state: &mut top.state,
            scope: &self.scope,
        };
        let disposition = handler.end(&mut ctx);

        match disposition {
            Disposition::Repeat { frame } => {
                trace!(block = %marker.name, body_start, "Block repeats");
                self.scope.replace_top(frame);
                self.cursor = body_start;
            }
            Disposition::Close => {
                self.notify(Notification::Ended);
                let closed = self.stack.pop(&mut self.scope);
                debug!(block = %marker.name, depth = self.stack.depth(), "Block closed");

                // Else-chain: the closing marker opens the next segment.
                let next = closing_names(handler.as_ref(), &marker.name);
                if next.is_empty() {
                    return;
                }
                let previous = closed.map(|entry| entry.state);
                if self.stack.output_enabled() {
                    self.open(marker, handler, next, previous);
                } else {
                    self.push_inert(marker, handler, next);
                }
            }
        }
    }

    fn unmatched_end(&mut self, marker: &Marker) {
        let expected = match self.stack.top() {
            Some(top) => format!(
                "innermost open block '{}' expects {}",
                top.name,
                top.closing_names.join(" or ")
            ),
            None => "no block is open".to_owned(),
        };
        let error = RenderError::new(
            RenderErrorKind::UnmatchedBlockEnd,
            format!("'{}' does not match: {expected}", marker.name),
            marker.span,
        );

        if self.engine.policy().strict_structure {
            self.cursor = marker.span.start;
            self.halt(error);
        } else {
            self.report(error);
            self.cursor = marker.span.end;
        }
    }

    fn unknown_block(&mut self, marker: &Marker) {
        self.cursor = marker.span.end;
        if !self.stack.output_enabled() {
            return;
        }

        let error = RenderError::new(
            RenderErrorKind::UnknownBlockName,
            format!("no block named '{}'", marker.name),
            marker.span,
        );
        if self.engine.policy().strict_unknown_blocks {
            self.cursor = marker.span.start;
            self.halt(error);
            return;
        }
        self.report(error);
        self.output.push_str(marker.source(self.template));
    }

    fn malformed(&mut self, malformed: MalformedMarker) {
        self.cursor = malformed.span.end;
        if !self.stack.output_enabled() {
            return;
        }

        let template = self.template;
        let raw = &template[malformed.span.range()];
        self.report(RenderError::new(
            RenderErrorKind::MalformedMarkerArguments,
            malformed.reason,
            malformed.span,
        ));
        self.output.push_str(raw);
    }

    /// Report every block still open at the end of the template, innermost
    /// first.
    fn close_unclosed(&mut self) {
        while let Some(entry) = self.stack.pop(&mut self.scope) {
            let error = RenderError::new(
                RenderErrorKind::UnclosedBlock,
                format!(
                    "'{}' is never closed (expected {})",
                    entry.name,
                    entry.closing_names.join(" or ")
                ),
                entry.span,
            )
            .halting();
            self.report(error);
        }
    }

    // ── Output and reporting ──────────────────────────────────────────────────

    fn emit_text(&mut self, start: usize, end: usize) {
        if start < end && self.stack.output_enabled() {
            self.output.push_str(&self.template[start..end]);
        }
    }

    fn report(&mut self, error: RenderError) {
        if error.continuing {
            warn!(kind = %error.kind, span = %error.span, "{}", error.message);
        } else {
            warn!(kind = %error.kind, span = %error.span, halting = true, "{}", error.message);
        }
        for listener in self.engine.listeners() {
            listener.error_encountered(&error);
        }
        self.errors.push(error);
    }

    fn halt(&mut self, error: RenderError) {
        self.halted = true;
        self.report(error.halting());
    }

    fn notify(&self, notification: Notification) {
        let listeners = self.engine.listeners();
        if listeners.is_empty() {
            return;
        }
        let Some(top) = self.stack.top() else {
            return;
        };

        let info = BlockInfo {
            name: top.name.clone(),
            closing_names: top.closing_names.clone(),
            args: top.args.clone(),
            span: top.span,
            variables: self.scope.flatten(),
        };
        for listener in listeners {
            match notification {
                Notification::Started => listener.block_started(&info),
                Notification::Ended => listener.block_ended(&info),
            }
        }
    }
}

fn closing_names(handler: &dyn BlockHandler, name: &str) -> Vec<String> {
    handler
        .closing_names(name)
        .iter()
        .map(|n| (*n).to_owned())
        .collect()
}
