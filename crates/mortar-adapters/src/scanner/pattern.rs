//! Regex-backed marker scanner.

use regex::Regex;
use tracing::debug;

use mortar_core::{
    application::{ApplicationError, ports::MarkerScanner},
    domain::{Delimiters, MalformedMarker, Marker, MarkerKind, ScanResult, Span},
    error::MortarResult,
};

use super::body::{self, Body};

/// Scanner built from one regex alternating the expression and tag
/// delimiters.
///
/// The pattern is rebuilt from the escaped delimiters in
/// `configuration_changed`. Until then no markers are found.
#[derive(Debug, Default, Clone)]
pub struct RegexScanner {
    compiled: Option<Compiled>,
}

#[derive(Debug, Clone)]
struct Compiled {
    pattern: Regex,
    literal_end: Regex,
    filter_delimiter: String,
}

impl RegexScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner already configured for `delimiters`.
    pub fn with_delimiters(delimiters: &Delimiters) -> MortarResult<Self> {
        let mut scanner = Self::new();
        scanner.configuration_changed(delimiters)?;
        Ok(scanner)
    }

    /// The compiled pattern, if configured.
    pub fn pattern(&self) -> Option<&str> {
        self.compiled.as_ref().map(|c| c.pattern.as_str())
    }
}

fn compile(delimiters: &Delimiters) -> Result<Regex, regex::Error> {
    let expression = format!(
        "{}(?P<expression>.*?){}",
        regex::escape(&delimiters.expression_start),
        regex::escape(&delimiters.expression_end)
    );
    let tag = format!(
        "{}(?P<tag>.*?){}",
        regex::escape(&delimiters.marker_start),
        regex::escape(&delimiters.marker_end)
    );

    // Alternation is leftmost-first: put the longer opener first so it wins
    // when one opener is a prefix of the other.
    let pattern = if delimiters.expression_start.len() >= delimiters.marker_start.len() {
        format!("(?s){expression}|{tag}")
    } else {
        format!("(?s){tag}|{expression}")
    };
    Regex::new(&pattern)
}

fn compile_literal_end(delimiters: &Delimiters) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"{}\s*{}\s*{}",
        regex::escape(&delimiters.marker_start),
        regex::escape(&delimiters.literal_end),
        regex::escape(&delimiters.marker_end)
    ))
}

impl MarkerScanner for RegexScanner {
    fn configuration_changed(&mut self, delimiters: &Delimiters) -> MortarResult<()> {
        let invalid = |e: regex::Error| ApplicationError::ScannerConfiguration {
            reason: e.to_string(),
        };
        let pattern = compile(delimiters).map_err(invalid)?;
        let literal_end = compile_literal_end(delimiters).map_err(invalid)?;
        debug!(pattern = %pattern.as_str(), "Marker pattern compiled");

        self.compiled = Some(Compiled {
            pattern,
            literal_end,
            filter_delimiter: delimiters.filter_delimiter.clone(),
        });
        Ok(())
    }

    fn next_marker(&self, template: &str, from: usize) -> Option<ScanResult> {
        let compiled = self.compiled.as_ref()?;
        if from >= template.len() {
            return None;
        }

        let captures = compiled.pattern.captures_at(template, from)?;
        let whole = captures.get(0)?;
        let span = Span::new(whole.start(), whole.end());

        let (kind, parsed) = if let Some(inner) = captures.name("expression") {
            (
                MarkerKind::Expression,
                body::parse_expression(inner.as_str().trim(), &compiled.filter_delimiter),
            )
        } else if let Some(inner) = captures.name("tag") {
            (MarkerKind::Tag, body::parse_tag(inner.as_str().trim()))
        } else {
            return None;
        };

        Some(
            parsed
                .map(|Body { name, args, filters }| Marker {
                    kind,
                    name,
                    args,
                    filters,
                    span,
                })
                .map_err(|reason| MalformedMarker::new(span, reason)),
        )
    }

    fn find_literal_end(&self, template: &str, from: usize, _: &Delimiters) -> Option<Span> {
        let compiled = self.compiled.as_ref()?;
        if from > template.len() {
            return None;
        }
        let found = compiled.literal_end.find_at(template, from)?;
        Some(Span::new(found.start(), found.end()))
    }
}
