//! Dynamic values held by model slots and records.
//!
//! `Value` is the single currency of the tracking engine: records carry it,
//! instance slots store it, coercion maps it, and the string projection in
//! [`Value::string_value`] is the equality basis for dirty checks.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A dynamically-typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Floating point number (may be NaN).
    Double(f64),
    /// Text value.
    Text(String),
    /// Raw binary payload, as delivered by some drivers for BIT/BOOLEAN columns.
    Bytes(Vec<u8>),
    /// Point in time carrying the offset it was observed in.
    Timestamp(DateTime<FixedOffset>),
    /// Structured value (object, array or parsed scalar).
    Json(serde_json::Value),
}

impl Value {
    /// Name of the variant, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    /// Loose truthiness.
    ///
    /// Falsy values are `Null`, `false`, zero, NaN, the empty string and the
    /// structural scalars with those meanings. Buffers, timestamps, objects
    /// and arrays are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0 && !d.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Bytes(_) | Value::Timestamp(_) => true,
            Value::Json(j) => json_truthy(j),
        }
    }

    /// Canonical string projection used for equality and export.
    ///
    /// Timestamps render as UTC ISO-8601 instants with millisecond precision,
    /// everything else as its plain text trimmed of surrounding whitespace.
    pub fn string_value(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => format_number(*d),
            Value::Text(s) => s.trim().to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).trim().to_string(),
            Value::Timestamp(ts) => iso_instant(ts),
            Value::Json(serde_json::Value::String(s)) => s.trim().to_string(),
            Value::Json(j) => j.to_string().trim().to_string(),
        }
    }

    /// Loose numeric conversion. Anything that does not read as a number is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(i) => *i as f64,
            Value::Double(d) => *d,
            Value::Text(s) => parse_number(s),
            Value::Bytes(b) => parse_number(&String::from_utf8_lossy(b)),
            Value::Timestamp(ts) => ts.timestamp_millis() as f64,
            Value::Json(j) => json_number(j),
        }
    }

    /// Build a number value, keeping integral results as `Int`.
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
            Value::Int(n as i64)
        } else {
            Value::Double(n)
        }
    }

    /// Convert to a JSON value.
    ///
    /// Timestamps become their ISO string, buffers become byte arrays and
    /// non-finite doubles become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Double(d) => serde_json::Number::from_f64(*d)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::from(b.clone()),
            Value::Timestamp(ts) => serde_json::Value::String(iso_instant(ts)),
            Value::Json(j) => j.clone(),
        }
    }

    /// Convert from a JSON value. Objects and arrays stay structural.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

/// String projection of an optional slot. An unset slot reads as `"undefined"`.
pub fn string_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_string(), Value::string_value)
}

fn iso_instant(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// Shortest digits in `d.ddde+x` form; the exponent always carries a sign.
fn exponent_form(n: f64) -> String {
    let text = format!("{n:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    // Rust also accepts "inf"/"nan" spellings; those are not numbers here.
    if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn json_number(json: &serde_json::Value) -> f64 {
    match json {
        serde_json::Value::Null => 0.0,
        serde_json::Value::Bool(b) => f64::from(u8::from(*b)),
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => parse_number(s),
        serde_json::Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => json_number(single),
            _ => f64::NAN,
        },
        serde_json::Value::Object(_) => f64::NAN,
    }
}

fn json_truthy(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts.fixed_offset())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
