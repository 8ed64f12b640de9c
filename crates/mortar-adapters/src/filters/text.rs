//! String filters. Non-string values are stringified first; null stays null
//! so a later `default` still applies.

use mortar_core::{application::ports::ArgumentError, domain::Value};

use super::arity;

fn map_text(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(f(&s)),
        other => Value::String(f(&other.to_string())),
    }
}

pub(super) fn upper(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, str::to_uppercase))
}

pub(super) fn lower(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, str::to_lowercase))
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub(super) fn capitalize(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, capitalize_word))
}

pub(super) fn title(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, |s| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for c in s.chars() {
            if c.is_alphanumeric() {
                if at_word_start {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                at_word_start = false;
            } else {
                out.push(c);
                at_word_start = true;
            }
        }
        out
    }))
}

pub(super) fn trim(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, |s| s.trim().to_owned()))
}

pub(super) fn escape(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    Ok(map_text(value, |s| {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }))
}

pub(super) fn replace(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let [from, to] = arity::<2>(args, "replace: FROM, TO")?;
    if from.is_empty() {
        return Err(ArgumentError::new("replace: FROM must not be empty"));
    }
    Ok(map_text(value, |s| s.replace(from.as_str(), to)))
}

pub(super) fn truncate(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let (limit, suffix) = match args {
        [limit] => (limit, "..."),
        [limit, suffix] => (limit, suffix.as_str()),
        _ => return Err(ArgumentError::new("expected truncate: N [, SUFFIX]")),
    };
    let limit: usize = limit
        .trim()
        .parse()
        .map_err(|_| ArgumentError::new(format!("truncate: '{limit}' is not a length")))?;

    Ok(map_text(value, |s| {
        if s.chars().count() <= limit {
            s.to_owned()
        } else {
            let mut out: String = s.chars().take(limit).collect();
            out.push_str(suffix);
            out
        }
    }))
}
