//! Marker body grammar.
//!
//! ```text
//! tag        := name arg*
//! expression := name arg* ( "|" filter )*
//! filter     := name [ ":" arg ( "," arg )* ]
//! ```
//!
//! Arguments are split on whitespace; single- or double-quoted runs are kept
//! together with their quotes so the engine can still tell literals from
//! names.

use mortar_core::domain::FilterSpec;

/// Parsed marker body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub name: String,
    pub args: Vec<String>,
    pub filters: Vec<FilterSpec>,
}

/// Parse a tag body (`for x in items`). Tags never carry filters.
pub fn parse_tag(body: &str) -> Result<Body, String> {
    let mut tokens = tokenize(body)?.into_iter();
    let name = tokens.next().ok_or("empty marker")?;
    Ok(Body {
        name,
        args: tokens.collect(),
        filters: Vec::new(),
    })
}

/// Parse an expression body (`user.name | truncate: 10`).
pub fn parse_expression(body: &str, filter_delimiter: &str) -> Result<Body, String> {
    let mut segments = split_outside_quotes(body, filter_delimiter)?.into_iter();
    let head = segments.next().unwrap_or_default();

    let mut tokens = tokenize(head)?.into_iter();
    let name = tokens.next().ok_or("empty marker")?;
    let args = tokens.collect();

    let filters = segments
        .map(parse_filter)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Body {
        name,
        args,
        filters,
    })
}

fn parse_filter(segment: &str) -> Result<FilterSpec, String> {
    let (name, args) = match split_outside_quotes(segment, ":")?.as_slice() {
        [name] => (name.trim(), None),
        [name, ..] => {
            // Re-join: only the first colon separates name from arguments.
            let start = name.len() + 1;
            (name.trim(), Some(&segment[start..]))
        }
        [] => ("", None),
    };
    if name.is_empty() {
        return Err("empty filter name".into());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("filter name '{name}' contains whitespace"));
    }

    let mut spec = FilterSpec::new(name);
    if let Some(args) = args {
        for arg in split_outside_quotes(args, ",")? {
            let arg = arg.trim();
            if arg.is_empty() {
                return Err(format!("empty argument to filter '{name}'"));
            }
            spec = spec.with_arg(arg);
        }
    }
    Ok(spec)
}

/// Split `text` on whitespace, keeping quoted runs (quotes included)
/// together.
pub fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Split on `separator` wherever it occurs outside quotes.
pub fn split_outside_quotes<'a>(text: &'a str, separator: &str) -> Result<Vec<&'a str>, String> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if text[i..].starts_with(separator) => {
                parts.push(&text[start..i]);
                start = i + separator.len();
                // Skip the rest of a multi-character separator.
                for _ in 1..separator.chars().count() {
                    chars.next();
                }
            }
            None => {}
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    parts.push(&text[start..]);
    Ok(parts)
}
