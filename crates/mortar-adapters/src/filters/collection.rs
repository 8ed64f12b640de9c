//! Size, fallback and joining filters.

use mortar_core::{application::ports::ArgumentError, domain::Value};

use super::arity;

pub(super) fn length(value: Value, _args: &[String]) -> Result<Value, ArgumentError> {
    let n = match &value {
        Value::Null => 0,
        other => other
            .len()
            .unwrap_or_else(|| other.to_string().chars().count()),
    };
    Ok(Value::from(n))
}

pub(super) fn default(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let [fallback] = arity::<1>(args, "default: VALUE")?;
    let missing = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    Ok(if missing {
        Value::from(fallback.as_str())
    } else {
        value
    })
}

pub(super) fn join(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let separator = match args {
        [] => ", ",
        [separator] => separator.as_str(),
        _ => return Err(ArgumentError::new("expected join: SEPARATOR")),
    };
    Ok(match value {
        Value::List(items) => Value::from(
            items
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(separator),
        ),
        other => other,
    })
}
