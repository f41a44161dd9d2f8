//! Coercions from loosely typed form values to store column values.
//!
//! Form posts arrive with whatever the browser produced: strings for almost
//! everything, booleans for checkboxes, arrays for multi-value groups. These
//! helpers turn one raw value into the shape a store column accepts, or into
//! nothing when the value should not be written at all.

use crate::store::Fields;
use chrono::NaiveDate;
use serde_json::{Number, Value};

/// Plain text. Numbers are rendered; anything else is treated as absent.
pub fn text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Email addresses, with surrounding whitespace removed.
pub fn email(raw: Option<&Value>) -> Option<String> {
    text(raw).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Region and state codes are stored uppercase.
pub fn upper(raw: Option<&Value>) -> Option<String> {
    text(raw).map(|s| s.to_uppercase())
}

/// Checkbox and yes/no answers. Never absent: anything unrecognised is `false`.
pub fn flag(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("on")
        }
        _ => false,
    }
}

/// Whole counts. Strings are read up to the first non-digit, so "12 people" is 12.
pub fn integer(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s.trim()),
        _ => None,
    }
}

/// Fractional quantities such as hours.
pub fn decimal(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_decimal(s.trim()),
        _ => None,
    }
}

/// Multi-value groups. A lone scalar becomes a one-element list.
pub fn string_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Some(other) => text(Some(other)).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Long-text columns that may receive structured data. Structures are stored as JSON text.
pub fn serialized_text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        v @ (Value::Array(_) | Value::Object(_)) => Some(v.to_string()),
        v => text(Some(v)),
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn leading_decimal(s: &str) -> Option<f64> {
    // Longest float-shaped prefix: sign, digits, optional fraction, optional exponent.
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digit_run(&bytes[end..]);
    end += whole;
    let mut mantissa = whole;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digit_run(&bytes[end + 1..]);
        if whole + fraction > 0 {
            end += 1 + fraction;
            mantissa += fraction;
        }
    }
    if mantissa == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits = digit_run(&bytes[exp..]);
        if digits > 0 {
            end = exp + digits;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Today's date as the store expects it in date columns.
pub fn date_stamp(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Accumulates store columns, skipping values that must not be written.
#[derive(Debug, Default)]
pub struct FieldSet {
    fields: Fields,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, column: &str, value: Option<String>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.fields.insert(column.to_string(), Value::String(v));
        }
        self
    }

    pub fn flag(mut self, column: &str, value: bool) -> Self {
        self.fields.insert(column.to_string(), Value::Bool(value));
        self
    }

    pub fn integer(mut self, column: &str, value: Option<i64>) -> Self {
        if let Some(v) = value {
            self.fields.insert(column.to_string(), Value::from(v));
        }
        self
    }

    pub fn decimal(mut self, column: &str, value: Option<f64>) -> Self {
        if let Some(n) = value.and_then(Number::from_f64) {
            self.fields.insert(column.to_string(), Value::Number(n));
        }
        self
    }

    pub fn list(mut self, column: &str, values: Vec<String>) -> Self {
        self.fields.insert(
            column.to_string(),
            Value::Array(values.into_iter().map(Value::String).collect()),
        );
        self
    }

    pub fn link(mut self, column: &str, record_id: Option<&str>) -> Self {
        if let Some(id) = record_id {
            self.fields
                .insert(column.to_string(), Value::Array(vec![Value::String(id.to_string())]));
        }
        self
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}
