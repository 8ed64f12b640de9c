//! Layered variable scope.
//!
//! ```text
//!   innermost  ┌──────────────────────┐
//!              │ block frame (for x)  │  pushed/popped with blocks
//!              ├──────────────────────┤
//!              │ block frame ...      │
//!              ├──────────────────────┤
//!              │ call frame           │  variables passed to `process`
//!              ├──────────────────────┤
//!   outermost  │ persistent frame     │  engine-level values (borrowed)
//!              └──────────────────────┘
//! ```
//!
//! Lookup walks innermost to outermost and the first binding wins. The
//! persistent frame is borrowed from the engine and never written by a
//! `process` call.

use std::collections::BTreeMap;

use crate::domain::value::Value;

/// One layer of name → value bindings.
pub type Frame = BTreeMap<String, Value>;

/// Scope chain for one `process` call.
#[derive(Debug, Clone)]
pub struct Scope<'e> {
    persistent: &'e Frame,
    /// `frames[0]` is the call frame and is never popped.
    frames: Vec<Frame>,
}

impl<'e> Scope<'e> {
    pub fn new(persistent: &'e Frame, call: Frame) -> Self {
        Self {
            persistent,
            frames: vec![call],
        }
    }

    /// Resolve a marker argument or expression name.
    ///
    /// Literals are recognised first: quoted strings, integers, floats,
    /// `true`/`false` and `null`/`nil`. Anything else is a dotted key path
    /// whose first segment is looked up through the frames.
    pub fn resolve(&self, name: &str) -> Option<Value> {
        let name = name.trim();
        if let Some(literal) = parse_literal(name) {
            return Some(literal);
        }

        let mut segments = name.split('.');
        let root = segments.next().filter(|s| !s.is_empty())?;
        self.lookup(root)?.lookup_path(segments)
    }

    /// First binding of `name` without key-path or literal handling.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.persistent.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the innermost block frame.
    ///
    /// The call frame is never popped. The block stack pushes and pops frames
    /// in lockstep with its entries, so a call here with no block frame is a
    /// bug in the engine: debug builds panic, release builds return `None`
    /// and leave the call frame in place.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        debug_assert!(self.frames.len() > 1, "attempted to pop the call frame");
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Replace the innermost block frame (used when a block repeats).
    ///
    /// With no block frame open, debug builds panic and release builds drop
    /// `frame`; the call frame is never replaced.
    pub fn replace_top(&mut self, frame: Frame) {
        debug_assert!(self.frames.len() > 1, "attempted to replace the call frame");
        let len = self.frames.len();
        if len > 1 {
            self.frames[len - 1] = frame;
        }
    }

    /// The innermost frame: the top block's frame, else the call frame.
    pub fn innermost(&self) -> &Frame {
        // `frames` always holds at least the call frame.
        &self.frames[self.frames.len() - 1]
    }

    /// Bind a value in the innermost frame.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(name.into(), value);
        }
    }

    /// Number of frames above the persistent frame (call frame included).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Merged view of every visible binding, innermost wins.
    pub fn flatten(&self) -> Frame {
        let mut merged = self.persistent.clone();
        for frame in &self.frames {
            merged.extend(frame.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }
}

/// Parse literal syntax used in marker arguments.
pub fn parse_literal(token: &str) -> Option<Value> {
    let token = token.trim();
    if let Some(inner) = unquote(token) {
        return Some(Value::String(inner.to_owned()));
    }
    match token {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" | "nil" => return Some(Value::Null),
        _ => {}
    }

    let starts_numeric = token
        .trim_start_matches(['-', '+'])
        .starts_with(|c: char| c.is_ascii_digit());
    if !starts_numeric {
        return None;
    }
    if let Ok(i) = token.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    token.parse::<f64>().ok().map(Value::Float)
}

/// Strip matching single or double quotes.
pub fn unquote(token: &str) -> Option<&str> {
    if token.len() < 2 {
        return None;
    }
    let first = token.chars().next()?;
    if (first == '"' || first == '\'') && token.ends_with(first) {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}
