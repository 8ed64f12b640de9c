//! Standard filters.
//!
//! Each filter is a plain function wrapped in [`StandardFilter`] together
//! with its names and a one-line summary for `mortar list`.

use std::sync::Arc;

use mortar_core::{
    application::ports::{ArgumentError, Filter},
    domain::Value,
};

mod collection;
mod color;
mod date;
mod text;

type ApplyFn = fn(Value, &[String]) -> Result<Value, ArgumentError>;

/// A filter backed by a function pointer.
#[derive(Debug, Clone, Copy)]
pub struct StandardFilter {
    names: &'static [&'static str],
    summary: &'static str,
    apply: ApplyFn,
}

impl StandardFilter {
    pub const fn new(names: &'static [&'static str], summary: &'static str, apply: ApplyFn) -> Self {
        Self {
            names,
            summary,
            apply,
        }
    }
}

impl Filter for StandardFilter {
    fn names(&self) -> &[&str] {
        self.names
    }

    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ArgumentError> {
        (self.apply)(value, args)
    }

    fn describe(&self) -> &str {
        self.summary
    }
}

pub const UPPER: StandardFilter =
    StandardFilter::new(&["upper", "uppercase"], "upper-case the text", text::upper);
pub const LOWER: StandardFilter =
    StandardFilter::new(&["lower", "lowercase"], "lower-case the text", text::lower);
pub const CAPITALIZE: StandardFilter = StandardFilter::new(
    &["capitalize", "capitalized"],
    "upper-case the first character, lower-case the rest",
    text::capitalize,
);
pub const TITLE: StandardFilter =
    StandardFilter::new(&["title"], "capitalize every word", text::title);
pub const TRIM: StandardFilter =
    StandardFilter::new(&["trim"], "strip surrounding whitespace", text::trim);
pub const ESCAPE: StandardFilter =
    StandardFilter::new(&["escape"], "escape HTML special characters", text::escape);
pub const REPLACE: StandardFilter = StandardFilter::new(
    &["replace"],
    "replace: FROM, TO - replace every occurrence",
    text::replace,
);
pub const TRUNCATE: StandardFilter = StandardFilter::new(
    &["truncate"],
    "truncate: N [, SUFFIX] - keep at most N characters",
    text::truncate,
);
pub const LENGTH: StandardFilter = StandardFilter::new(
    &["length"],
    "number of characters, items or entries",
    collection::length,
);
pub const DEFAULT: StandardFilter = StandardFilter::new(
    &["default"],
    "default: VALUE - used when the value is null or empty",
    collection::default,
);
pub const JOIN: StandardFilter = StandardFilter::new(
    &["join"],
    "join: SEP - join list items",
    collection::join,
);
pub const DATE_FORMAT: StandardFilter = StandardFilter::new(
    &["date_format"],
    "date_format: FMT - format a date, RFC 3339 string or unix timestamp",
    date::date_format,
);

pub const COLOR_FORMAT: StandardFilter = StandardFilter::new(
    &["color_format"],
    "color_format: hex|rgb - format an [r, g, b] list, r/g/b map or #rrggbb string",
    color::color_format,
);

/// Every standard filter, ready for `EngineBuilder::filters`.
pub fn standard_filters() -> Vec<Arc<dyn Filter>> {
    [
        UPPER,
        LOWER,
        CAPITALIZE,
        TITLE,
        TRIM,
        ESCAPE,
        REPLACE,
        TRUNCATE,
        LENGTH,
        DEFAULT,
        JOIN,
        DATE_FORMAT,
        COLOR_FORMAT,
    ]
    .into_iter()
    .map(|filter| Arc::new(filter) as Arc<dyn Filter>)
    .collect()
}

/// Exactly `N` arguments or an error naming the expected form.
fn arity<'a, const N: usize>(
    args: &'a [String],
    usage: &str,
) -> Result<&'a [String; N], ArgumentError> {
    args.try_into()
        .map_err(|_| ArgumentError::new(format!("expected {usage}")))
}
