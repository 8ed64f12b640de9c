//! Inline markers: `set`, `now` and `cycle`.
//!
//! None of these open a block. They write output and/or bind values into
//! the innermost scope frame.

use std::fmt::Write;

use chrono::{Local, NaiveDateTime, format::StrftimeItems};

use mortar_core::{
    application::ports::{ArgumentError, BlockHandler, Opening, StartContext},
    domain::{Value, unquote},
};

/// Default `now` format.
pub const DEFAULT_NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── set ───────────────────────────────────────────────────────────────────────

/// `{% set name value %}`: bind a literal or a resolved value.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetMarker;

impl BlockHandler for SetMarker {
    fn names(&self) -> &[&str] {
        &["set"]
    }

    fn closing_names(&self, _name: &str) -> &[&str] {
        &[]
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        let [name, value] = ctx.args else {
            return Err(ArgumentError::new("expected 'set NAME VALUE'"));
        };
        let value = ctx
            .resolve(value)
            .ok_or_else(|| ArgumentError::new(format!("'{value}' is not defined")))?;
        Ok(Opening::new().bind(name.as_str(), value))
    }

    fn describe(&self) -> &str {
        "bind a value in the current scope"
    }
}

// ── now ───────────────────────────────────────────────────────────────────────

/// `{% now ["%d %B %Y"] %}`: the current local time.
#[derive(Debug, Clone, Copy)]
pub struct NowMarker {
    clock: fn() -> NaiveDateTime,
}

impl Default for NowMarker {
    fn default() -> Self {
        Self {
            clock: || Local::now().naive_local(),
        }
    }
}

impl NowMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed clock (tests, reproducible builds).
    pub fn with_clock(clock: fn() -> NaiveDateTime) -> Self {
        Self { clock }
    }
}

impl BlockHandler for NowMarker {
    fn names(&self) -> &[&str] {
        &["now"]
    }

    fn closing_names(&self, _name: &str) -> &[&str] {
        &[]
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        let format = match ctx.args {
            [] => DEFAULT_NOW_FORMAT,
            [format] => unquote(format).unwrap_or(format.as_str()),
            _ => return Err(ArgumentError::new("expected at most one format argument")),
        };
        let text = format_time((self.clock)(), format)?;
        Ok(Opening::new().emit(text))
    }

    fn describe(&self) -> &str {
        "insert the current date and time"
    }
}

/// Format `time` with a strftime string. Invalid specifiers (and offset
/// specifiers, which a naive time cannot satisfy) are argument errors.
pub(crate) fn format_time(time: NaiveDateTime, format: &str) -> Result<String, ArgumentError> {
    let mut out = String::new();
    write!(out, "{}", time.format_with_items(StrftimeItems::new(format)))
        .map_err(|_| ArgumentError::new(format!("invalid time format '{format}'")))?;
    Ok(out)
}

// ── cycle ─────────────────────────────────────────────────────────────────────

/// `{% cycle "odd" "even" %}`: pick by the enclosing loop's `loop.index0`.
///
/// Outside a loop the first value is used.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleMarker;

impl BlockHandler for CycleMarker {
    fn names(&self) -> &[&str] {
        &["cycle"]
    }

    fn closing_names(&self, _name: &str) -> &[&str] {
        &[]
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        if ctx.args.is_empty() {
            return Err(ArgumentError::new("expected at least one value"));
        }
        let index = ctx
            .resolve("loop.index0")
            .and_then(|v| v.as_i64())
            .and_then(|i| usize::try_from(i).ok())
            .unwrap_or(0);

        let token = &ctx.args[index % ctx.args.len()];
        let value = ctx
            .resolve(token)
            .unwrap_or_else(|| Value::from(token.as_str()));
        Ok(Opening::new().emit(value.to_string()))
    }

    fn describe(&self) -> &str {
        "alternate between values on each loop pass"
    }
}
