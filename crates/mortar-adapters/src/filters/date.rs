//! `date_format`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use mortar_core::{application::ports::ArgumentError, domain::Value};

use super::arity;
use crate::blocks::format_time;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub(super) fn date_format(value: Value, args: &[String]) -> Result<Value, ArgumentError> {
    let [format] = arity::<1>(args, "date_format: FORMAT")?;
    if value.is_null() {
        return Ok(value);
    }
    let time = parse_time(&value)?;
    format_time(time, format).map(Value::from)
}

/// Accepts unix timestamps (seconds, UTC), RFC 3339 strings (kept in their
/// own offset), `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
fn parse_time(value: &Value) -> Result<NaiveDateTime, ArgumentError> {
    let unparseable = || ArgumentError::new(format!("'{value}' is not a date"));

    match value {
        Value::Integer(secs) => DateTime::from_timestamp(*secs, 0)
            .map(|t| t.naive_utc())
            .ok_or_else(unparseable),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Ok(t.naive_local());
            }
            if let Some(t) = NAIVE_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
            {
                return Ok(t);
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(unparseable)
        }
        _ => Err(unparseable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: Value, format: &str) -> Result<Value, ArgumentError> {
        date_format(value, &[format.to_owned()])
    }

    #[test]
    fn formats_plain_dates() {
        assert_eq!(fmt(Value::from("2024-03-09"), "%d/%m/%Y").unwrap(), Value::from("09/03/2024"));
    }

    #[test]
    fn formats_rfc3339_in_its_own_offset() {
        assert_eq!(
            fmt(Value::from("2024-03-09T23:30:00+02:00"), "%Y-%m-%d %H:%M").unwrap(),
            Value::from("2024-03-09 23:30")
        );
    }

    #[test]
    fn formats_unix_timestamps_as_utc() {
        assert_eq!(fmt(Value::from(0), "%Y-%m-%d").unwrap(), Value::from("1970-01-01"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(fmt(Value::from("yesterday"), "%Y").is_err());
        assert!(fmt(Value::from(true), "%Y").is_err());
        assert!(fmt(Value::from("2024-03-09"), "%Q").is_err());
        assert!(date_format(Value::from("2024-03-09"), &[]).is_err());
    }

    #[test]
    fn null_stays_null() {
        assert_eq!(fmt(Value::Null, "%Y").unwrap(), Value::Null);
    }
}
