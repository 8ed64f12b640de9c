//! `for` loops.
//!
//! ```text
//! {% for x in items [reversed] %} ... {% endfor %}
//! {% for i from 1 to 10 [reversed] %} ... {% endfor %}
//! ```
//!
//! Each pass binds the loop variable and a `loop` map (`index`, `index0`,
//! `first`, `last`, `length`) in the block's own frame. Iterating a map
//! yields `{key, value}` entries in key order.

use std::collections::BTreeMap;

use mortar_core::{
    application::ports::{ArgumentError, BlockHandler, Disposition, EndContext, Opening, StartContext},
    domain::{Frame, Value},
};

/// Largest range a `for i from A to B` loop may produce.
pub const MAX_RANGE_LEN: u64 = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ForBlock;

impl ForBlock {
    pub fn new() -> Self {
        Self
    }
}

/// One pass over the items held in the block state.
///
/// The state is a map of `items` and `index`. Only `index` changes between
/// passes; the item list is stored once when the loop opens.
struct Pass<'a> {
    items: &'a [Value],
    index: usize,
}

impl<'a> Pass<'a> {
    fn from_state(state: &'a BTreeMap<String, Value>) -> Option<Self> {
        let items = state.get("items")?.as_list()?;
        let index = usize::try_from(state.get("index")?.as_i64()?).ok()?;
        Some(Self { items, index })
    }

    fn frame(&self, var: &str) -> Frame {
        let length = self.items.len();
        let mut frame = Frame::new();
        frame.insert(var.to_owned(), self.items[self.index].clone());
        frame.insert(
            "loop".into(),
            Value::map_from([
                ("index", Value::from(self.index + 1)),
                ("index0", Value::from(self.index)),
                ("first", Value::from(self.index == 0)),
                ("last", Value::from(self.index + 1 == length)),
                ("length", Value::from(length)),
            ]),
        );
        frame
    }
}

impl BlockHandler for ForBlock {
    fn names(&self) -> &[&str] {
        &["for"]
    }

    fn closing_names(&self, name: &str) -> &[&str] {
        match name {
            "for" => &["endfor"],
            _ => &[],
        }
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        let (args, reversed) = match ctx.args {
            [rest @ .., last] if last == "reversed" => (rest, true),
            all => (all, false),
        };

        let (var, mut items) = match args {
            [var, keyword, source] if keyword == "in" => (var, iterate(ctx, source)?),
            [var, from, a, to, b] if from == "from" && to == "to" => {
                (var, range(bound(ctx, a)?, bound(ctx, b)?)?)
            }
            _ => {
                return Err(ArgumentError::new(
                    "expected 'for NAME in LIST' or 'for NAME from A to B'",
                ));
            }
        };
        if !is_identifier(var) {
            return Err(ArgumentError::new(format!("'{var}' is not a valid loop variable")));
        }
        if reversed {
            items.reverse();
        }

        if items.is_empty() {
            return Ok(Opening::new().output_if(false));
        }
        let frame = Pass { items: &items, index: 0 }.frame(var);
        Ok(Opening::new().with_frame(frame).with_state(Value::map_from([
            ("items", Value::List(items)),
            ("index", Value::from(0)),
        ])))
    }

    fn end(&self, ctx: &mut EndContext<'_, '_>) -> Disposition {
        let args = ctx.args;
        let Some(var) = args.first() else {
            return Disposition::Close;
        };
        let Value::Map(state) = &mut *ctx.state else {
            return Disposition::Close;
        };

        let Some(pass) = Pass::from_state(state) else {
            return Disposition::Close;
        };
        let next = pass.index + 1;
        if next >= pass.items.len() {
            return Disposition::Close;
        }
        let frame = Pass { items: pass.items, index: next }.frame(var);
        state.insert("index".into(), Value::from(next));
        Disposition::Repeat { frame }
    }

    fn describe(&self) -> &str {
        "repeat the body for each item of a list or map, or each integer of a range"
    }
}

fn iterate(ctx: &StartContext<'_, '_>, source: &str) -> Result<Vec<Value>, ArgumentError> {
    match ctx.resolve(source) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::List(items)) => Ok(items),
        Some(Value::Map(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| Value::map_from([("key", Value::from(key)), ("value", value)]))
            .collect()),
        Some(other) => Err(ArgumentError::new(format!(
            "cannot iterate over {} '{source}'",
            other.type_name()
        ))),
    }
}

fn bound(ctx: &StartContext<'_, '_>, token: &str) -> Result<i64, ArgumentError> {
    ctx.resolve(token)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ArgumentError::new(format!("range bound '{token}' is not an integer")))
}

/// Inclusive range, descending when `a > b`.
fn range(a: i64, b: i64) -> Result<Vec<Value>, ArgumentError> {
    if a.abs_diff(b) >= MAX_RANGE_LEN {
        return Err(ArgumentError::new(format!(
            "range {a} to {b} exceeds {MAX_RANGE_LEN} items"
        )));
    }
    let items = if a <= b {
        (a..=b).map(Value::from).collect()
    } else {
        (b..=a).rev().map(Value::from).collect()
    };
    Ok(items)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use mortar_core::domain::{Scope, Span};

    fn open(args: &[String], scope: &Scope<'_>) -> Opening {
        let ctx = StartContext {
            name: "for",
            args,
            span: Span::new(0, 0),
            scope,
            previous: None,
        };
        ForBlock.start(&ctx).unwrap()
    }

    fn close(args: &[String], frame: &Frame, state: &mut Value, scope: &Scope<'_>) -> Disposition {
        let mut ctx = EndContext {
            name: "for",
            args,
            closing_name: "endfor",
            closing_args: &[],
            frame,
            state,
            scope,
        };
        ForBlock.end(&mut ctx)
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn passes_advance_until_exhausted() {
        let persistent = Frame::new();
        let scope = Scope::new(&persistent, Frame::new());
        let args = words("i from 1 to 3");

        let Opening { frame, mut state, .. } = open(&args, &scope);
        assert_eq!(frame.get("i"), Some(&Value::from(1)));

        let mut seen = vec![];
        while let Disposition::Repeat { frame: next } = close(&args, &frame, &mut state, &scope) {
            seen.push(next["i"].clone());
            assert_eq!(next["loop"].get("length"), Some(&Value::from(3)));
        }
        assert_eq!(seen, [Value::from(2), Value::from(3)]);
        assert_eq!(state.get("index"), Some(&Value::from(2)));
    }

    #[test]
    fn long_ranges_run_in_linear_time() {
        let persistent = Frame::new();
        let scope = Scope::new(&persistent, Frame::new());
        let args = words("i from 1 to 100000");

        let started = Instant::now();
        let Opening { frame, mut state, .. } = open(&args, &scope);
        let mut passes = 1;
        while let Disposition::Repeat { .. } = close(&args, &frame, &mut state, &scope) {
            passes += 1;
        }

        assert_eq!(passes, 100_000);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn range_limit_is_enforced() {
        let persistent = Frame::new();
        let scope = Scope::new(&persistent, Frame::new());
        let args = words("i from 0 to 1000000");
        let ctx = StartContext {
            name: "for",
            args: &args,
            span: Span::new(0, 0),
            scope: &scope,
            previous: None,
        };

        assert!(ForBlock.start(&ctx).is_err());
    }
}
