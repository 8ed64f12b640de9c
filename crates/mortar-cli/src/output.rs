//! Output management and formatting.
//!
//! Rendered text goes to stdout untouched. Status lines go to stdout and
//! are silenced by `--quiet`. Template problems and `--events` traces go to
//! stderr so they never mix with rendered text.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde_json::json;

use mortar_core::{application::EngineEvent, domain::RenderError};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
    diagnostics: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
            diagnostics: Term::stderr(),
        }
    }

    // ── stdout ─────────────────────────────────────────────────────────────

    /// Rendered template text, byte for byte. Never suppressed.
    pub fn rendered(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        self.term.flush()
    }

    /// Pretty-printed JSON document. Never suppressed.
    pub fn json(&self, value: &serde_json::Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{2713}", msg, |s| s.green().bold().to_string())
    }

    /// `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{26a0}", msg, |s| s.yellow().bold().to_string())
    }

    /// `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.marked("\u{2139}", msg, |s| s.blue().bold().to_string())
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    // ── stderr ─────────────────────────────────────────────────────────────

    /// One reported template problem, with its line and column in
    /// `template`. Halting problems are shown even in quiet mode.
    pub fn problem(&self, name: &str, template: &str, error: &RenderError) -> io::Result<()> {
        if self.quiet && error.continuing {
            return Ok(());
        }
        let (line, column) = position(template, error.span.start);
        let location = format!("{name}:{line}:{column}");
        let text = if self.no_color {
            format!("{location}: {}: {}", error.kind, error.message)
        } else if error.continuing {
            format!(
                "{}: {}: {}",
                location.bold(),
                error.kind.yellow(),
                error.message
            )
        } else {
            format!("{}: {}: {}", location.bold(), error.kind.red(), error.message)
        };
        self.diagnostics.write_line(&text)
    }

    /// One `--events` trace line.
    pub fn event(&self, event: &EngineEvent) -> io::Result<()> {
        let line = match event {
            EngineEvent::BlockStarted(info) => {
                format!("start  {} {} [{}]", info.name, info.args.join(" "), info.span)
            }
            EngineEvent::BlockEnded(info) => format!("end    {} [{}]", info.name, info.span),
            EngineEvent::Error(error) => format!("error  {} [{}]", error.kind, error.span),
            EngineEvent::Finished => "finish".to_owned(),
        };
        let line = if self.no_color {
            line
        } else {
            line.dimmed().to_string()
        };
        self.diagnostics.write_line(&line)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    fn marked(&self, mark: &str, msg: &str, paint: impl Fn(&str) -> String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("{mark} {msg}")
        } else {
            format!("{} {msg}", paint(mark))
        };
        self.term.write_line(&line)
    }
}

/// JSON description of a reported problem.
pub fn problem_json(template: &str, error: &RenderError) -> serde_json::Value {
    let (line, column) = position(template, error.span.start);
    json!({
        "kind": error.kind.as_str(),
        "message": error.message,
        "start": error.span.start,
        "end": error.span.end,
        "line": line,
        "column": column,
        "continuing": error.continuing,
    })
}

/// 1-based line and character column of byte `offset`.
fn position(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    (line, column)
}
