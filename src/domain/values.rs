// src/domain/values.rs
//
// Loosely-typed request values <-> storage values
//
// Request bodies arrive as JSON with numbers as strings, blanks for
// "not filled in" and dates in several shapes. Everything entering the
// database goes through `to_sql`, everything leaving it through `from_sql`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Number, Value};

use crate::error::{AppError, AppResult};

/// A loosely-typed row, keyed by API field name
pub type Record = Map<String, Value>;

/// Storage kind of a column or form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
    /// Stored as `YYYY-MM-DD` text
    Date,
}

/// Null, or a string with nothing but whitespace
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse a path/query id. Ids are positive integers.
pub fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::validation(format!("Invalid id '{}'", raw)))
}

/// Integer out of a JSON number or numeric string; `None` when it isn't one.
pub fn json_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Pagination-style parameter: invalid or non-positive becomes `None`.
pub fn lenient_u32(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(json_integer)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Normalize a date to `YYYY-MM-DD`. Accepts plain dates, RFC 3339 and
/// naive date-times.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok())?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Coerce a request value to its storage form.
///
/// Blank values become NULL. The error string describes the rejected value.
pub fn to_sql(kind: ValueKind, value: &Value) -> Result<SqlValue, String> {
    if is_blank(value) {
        return Ok(SqlValue::Null);
    }

    match kind {
        ValueKind::Integer => match value {
            Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
            other => json_integer(other)
                .map(SqlValue::Integer)
                .ok_or_else(|| format!("expected an integer, got {}", other)),
        },
        ValueKind::Real => {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .filter(|f| f.is_finite())
                .map(SqlValue::Real)
                .ok_or_else(|| format!("expected a number, got {}", value))
        }
        ValueKind::Text => match value {
            Value::String(s) => Ok(SqlValue::Text(s.trim().to_string())),
            Value::Number(n) => Ok(SqlValue::Text(n.to_string())),
            Value::Bool(b) => Ok(SqlValue::Text(b.to_string())),
            other => Err(format!("expected text, got {}", other)),
        },
        ValueKind::Date => match value {
            Value::String(s) => normalize_date(s)
                .map(SqlValue::Text)
                .ok_or_else(|| format!("expected a date, got '{}'", s)),
            other => Err(format!("expected a date, got {}", other)),
        },
    }
}

/// Storage value back to JSON
pub fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(_) => Value::Null,
    }
}
