//! Loose value coercion.
//!
//! Exported snapshots spell booleans, numbers and dates in several ways.
//! This is the only module that interprets those spellings; everything past
//! the adapter works with typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Timestamp layouts accepted in exports, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Interpret a raw value as a boolean flag.
///
/// `true`, `1` and the strings `"true"`, `"1"`, `"yes"` and `"verified"`
/// (case-insensitive) are true. Everything else, `null` included, is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim();
            s == "1"
                || s.eq_ignore_ascii_case("true")
                || s.eq_ignore_ascii_case("yes")
                || s.eq_ignore_ascii_case("verified")
        }
        _ => false,
    }
}

/// Parse a timestamp in any of the export layouts.
///
/// Date-only values resolve to midnight. RFC 3339 values with an offset are
/// converted to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a lifecycle order id from a number or a numeric string.
pub fn parse_order(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a scalar as a trimmed, non-empty string.
///
/// Integral floats lose their fraction so `12.0` and `"12"` agree.
pub fn coerce_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Like [`coerce_string`] but keeps surrounding whitespace.
///
/// Certification names carry their raw spelling into naming diagnostics.
pub fn raw_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other => coerce_string(other),
    }
}
