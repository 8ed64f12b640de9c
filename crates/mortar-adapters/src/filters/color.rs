//! `color_format`.
//!
//! A colour is a list `[r, g, b]` (an optional fourth alpha item is
//! ignored), a map with `r`, `g` and `b` keys, or a `#rgb`/`#rrggbb`
//! string. Integer channels are 0-255; float channels are fractions of 1.

use mortar_core::{application::ports::ArgumentError, domain::Value};

pub(super) fn color_format(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let format = match args {
        [] => "hex",
        [format] => format.as_str(),
        _ => return Err(ArgumentError::new("expected color_format: hex|rgb")),
    };
    let [r, g, b] = channels(&value)?;
    match format {
        "hex" => Ok(Value::from(format!("{r:02X}{g:02X}{b:02X}"))),
        "rgb" => Ok(Value::from(format!("rgb({r}, {g}, {b})"))),
        other => Err(ArgumentError::new(format!(
            "unknown colour format '{other}' (expected hex or rgb)"
        ))),
    }
}

fn channels(value: &Value) -> Result<[u8; 3], ArgumentError> {
    let not_a_colour = || ArgumentError::new(format!("'{value}' is not a colour"));

    let parts: Vec<&Value> = match value {
        Value::List(items) if matches!(items.len(), 3 | 4) => items.iter().take(3).collect(),
        Value::Map(map) => ["r", "g", "b"]
            .iter()
            .map(|key| map.get(*key))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(not_a_colour)?,
        Value::String(text) => return parse_hex(text).ok_or_else(not_a_colour),
        _ => return Err(not_a_colour()),
    };

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = channel(part).ok_or_else(not_a_colour)?;
    }
    Ok(rgb)
}

fn channel(value: &Value) -> Option<u8> {
    match value {
        Value::Integer(i) => u8::try_from(*i).ok(),
        Value::Float(f) if (0.0..=1.0).contains(f) => Some((f * 255.0).round() as u8),
        _ => None,
    }
}

fn parse_hex(text: &str) -> Option<[u8; 3]> {
    let digits = text.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let full: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_owned(),
        _ => return None,
    };
    let byte = |at: usize| u8::from_str_radix(&full[at..at + 2], 16).ok();
    Some([byte(0)?, byte(2)?, byte(4)?])
}
