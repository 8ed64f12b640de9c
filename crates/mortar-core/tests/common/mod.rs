//! Shared fixtures: a plain string-search scanner and a few small block
//! handlers. The production scanner and blocks live in `mortar-adapters`.

#![allow(dead_code)]

use std::sync::Arc;

use mortar_core::prelude::*;

/// Finds the earliest expression or tag marker with `str::find`.
#[derive(Debug, Default)]
pub struct SplitScanner {
    delimiters: Delimiters,
}

impl MarkerScanner for SplitScanner {
    fn configuration_changed(&mut self, delimiters: &Delimiters) -> MortarResult<()> {
        self.delimiters = delimiters.clone();
        Ok(())
    }

    fn next_marker(&self, template: &str, from: usize) -> Option<ScanResult> {
        let d = &self.delimiters;
        let rest = &template[from..];
        let expression = rest
            .find(d.expression_start.as_str())
            .map(|i| (i, MarkerKind::Expression));
        let tag = rest.find(d.marker_start.as_str()).map(|i| (i, MarkerKind::Tag));
        let (offset, kind) = match (expression, tag) {
            (Some(e), Some(t)) => {
                if e.0 <= t.0 {
                    e
                } else {
                    t
                }
            }
            (e, t) => e.or(t)?,
        };

        let (open, close) = match kind {
            MarkerKind::Expression => (&d.expression_start, &d.expression_end),
            MarkerKind::Tag => (&d.marker_start, &d.marker_end),
        };
        let start = from + offset;
        let body_start = start + open.len();
        let body_len = template[body_start..].find(close.as_str())?;
        let span = Span::new(start, body_start + body_len + close.len());
        let body = template[body_start..body_start + body_len].trim();

        if body.is_empty() {
            return Some(Err(MalformedMarker::new(span, "empty marker")));
        }

        let marker = match kind {
            MarkerKind::Expression => {
                let mut parts = body.split(d.filter_delimiter.as_str());
                let name = parts.next().unwrap_or_default().trim();
                let mut marker = Marker::expression(name, span);
                for part in parts {
                    let (filter, args) = part.split_once(':').unwrap_or((part, ""));
                    let mut spec = FilterSpec::new(filter.trim());
                    for arg in args.split(',').map(str::trim).filter(|a| !a.is_empty()) {
                        spec = spec.with_arg(arg);
                    }
                    marker = marker.with_filter(spec);
                }
                marker
            }
            MarkerKind::Tag => {
                let mut words = body.split_whitespace();
                let name = words.next().unwrap_or_default();
                Marker::tag(name, words.map(String::from).collect(), span)
            }
        };
        Some(Ok(marker))
    }
}

/// `{% for x in items %} ... {% endfor %}`
pub struct Each;

impl BlockHandler for Each {
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
        let [var, keyword, source] = ctx.args else {
            return Err(ArgumentError::new("expected 'for NAME in LIST'"));
        };
        if keyword != "in" {
            return Err(ArgumentError::new("expected 'in'"));
        }

        let items = ctx
            .resolve(source)
            .and_then(|v| v.as_list().map(<[Value]>::to_vec))
            .unwrap_or_default();
        let Some(first) = items.first().cloned() else {
            return Ok(Opening::new().output_if(false));
        };

        Ok(Opening::new()
            .bind(var.as_str(), first)
            .with_state(Value::map_from([
                ("index", Value::from(0)),
                ("items", Value::List(items)),
            ])))
    }

    fn end(&self, ctx: &mut EndContext<'_, '_>) -> Disposition {
        let items = ctx
            .state
            .get("items")
            .and_then(Value::as_list)
            .map(<[Value]>::to_vec)
            .unwrap_or_default();
        let next = ctx.state.get("index").and_then(Value::as_i64).unwrap_or(0) as usize + 1;
        if next >= items.len() {
            return Disposition::Close;
        }

        let var = ctx.args[0].clone();
        let item = items[next].clone();
        *ctx.state = Value::map_from([("index", Value::from(next)), ("items", Value::List(items))]);
        Disposition::Repeat {
            frame: frame([(var, item)]),
        }
    }
}

/// `{% if x %} ... {% else %} ... {% endif %}`
pub struct When;

impl BlockHandler for When {
    fn names(&self) -> &[&str] {
        &["if"]
    }

    fn closing_names(&self, name: &str) -> &[&str] {
        match name {
            "if" => &["else", "endif"],
            "else" => &["endif"],
            _ => &[],
        }
    }

    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        if ctx.name == "else" {
            let taken = ctx.previous.is_some_and(Value::is_truthy);
            return Ok(Opening::new().output_if(!taken).with_state(true));
        }

        let [condition] = ctx.args else {
            return Err(ArgumentError::new("expected one condition"));
        };
        let holds = ctx.resolve(condition).is_some_and(|v| v.is_truthy());
        Ok(Opening::new().output_if(holds).with_state(holds))
    }
}

/// `{% set name value %}`
pub struct Assign;

impl BlockHandler for Assign {
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
        let value = ctx.resolve(value).unwrap_or_default();
        Ok(Opening::new().bind(name.as_str(), value))
    }
}

/// Engine with the test scanner, the three handlers above and two filters.
pub fn engine() -> Engine {
    Engine::builder()
        .scanner(Box::new(SplitScanner::default()))
        .block(Arc::new(Each))
        .block(Arc::new(When))
        .block(Arc::new(Assign))
        .filter(Arc::new(FnFilter::new("upper", |v: Value, _: &[String]| {
            Ok(Value::from(v.to_string().to_uppercase()))
        })))
        .filter(Arc::new(FnFilter::new("suffix", |v: Value, args: &[String]| {
            let [suffix] = args else {
                return Err(ArgumentError::new("suffix takes one argument"));
            };
            Ok(Value::from(format!("{v}{suffix}")))
        })))
        .build()
        .expect("test engine builds")
}

pub fn kinds(rendered: &Rendered) -> Vec<RenderErrorKind> {
    rendered.errors.iter().map(|e| e.kind).collect()
}
