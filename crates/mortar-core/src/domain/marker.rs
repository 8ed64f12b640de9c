//! Markers discovered in template text.
//!
//! A [`Marker`] is produced by a marker scanner, dispatched once by the
//! engine, and dropped. Spans are byte offsets into the template text.

use std::fmt;
use std::ops::Range;

/// Half-open byte range `[start, end)` within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// What the scanner found.
///
/// Scanners only distinguish expressions from tags. Whether a tag opens a
/// block, closes one, or starts a literal region is decided by the engine,
/// which knows the open blocks and the configured literal markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// `{{ name | filter }}`
    Expression,
    /// `{% name args %}`
    Tag,
}

impl MarkerKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter attachment: name plus raw argument strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            write!(f, ": {}", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// One marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// First token of the marker body.
    pub name: String,
    /// Remaining tokens, quotes preserved.
    pub args: Vec<String>,
    /// Filters applied left to right. Only expressions carry filters.
    pub filters: Vec<FilterSpec>,
    pub span: Span,
}

impl Marker {
    pub fn expression(name: impl Into<String>, span: impl Into<Span>) -> Self {
        Self {
            kind: MarkerKind::Expression,
            name: name.into(),
            args: Vec::new(),
            filters: Vec::new(),
            span: span.into(),
        }
    }

    pub fn tag(name: impl Into<String>, args: Vec<String>, span: impl Into<Span>) -> Self {
        Self {
            kind: MarkerKind::Tag,
            name: name.into(),
            args,
            filters: Vec::new(),
            span: span.into(),
        }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    /// The marker's raw source text.
    pub fn source<'t>(&self, template: &'t str) -> &'t str {
        &template[self.span.range()]
    }
}

/// A delimited region the scanner found but could not parse, such as an
/// empty `{{ }}` or an unterminated quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMarker {
    pub span: Span,
    pub reason: String,
}

impl MalformedMarker {
    pub fn new(span: impl Into<Span>, reason: impl Into<String>) -> Self {
        Self {
            span: span.into(),
            reason: reason.into(),
        }
    }
}

/// What a scanner returns for each delimited region.
pub type ScanResult = Result<Marker, MalformedMarker>;
