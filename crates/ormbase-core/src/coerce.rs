//! Type coercion applied on import, export, comparison and key extraction.
//!
//! Coercion is advisory normalization, not validation: it never fails. A
//! value that does not fit its declared type is either mapped to the type's
//! "not a value" form (NaN for numbers) or passed through unchanged.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::field::{ColumnOptions, ColumnType};
use crate::value::Value;

/// Wire sentinel some drivers use for an empty DATE column.
pub const ZERO_DATE: &str = "0000-00-00";

/// Which zone "local" means for date revival and midnight normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// The host's local zone, including its DST rules.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl TimeBasis {
    /// Interpret a wall-clock time in this zone.
    ///
    /// Ambiguous times resolve to the earlier instant; times inside a DST gap
    /// have no instant and yield `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            TimeBasis::Local => chrono::Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            TimeBasis::Fixed(offset) => offset.from_local_datetime(&naive).earliest(),
        }
    }

    /// Calendar day of `ts` as seen from this zone.
    pub fn local_date(&self, ts: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            TimeBasis::Local => ts.with_timezone(&chrono::Local).date_naive(),
            TimeBasis::Fixed(offset) => ts.with_timezone(offset).date_naive(),
        }
    }
}

fn date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})").ok())
        .as_ref()
}

/// Coercion rules bound to a [`TimeBasis`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coercer {
    basis: TimeBasis,
}

impl Coercer {
    pub const fn new(basis: TimeBasis) -> Self {
        Self { basis }
    }

    pub const fn basis(&self) -> TimeBasis {
        self.basis
    }

    /// Normalize `value` according to the column's declared type.
    ///
    /// `None` stands for an unset slot. Number and boolean columns always
    /// produce a value (NaN and `false` respectively); the other types keep
    /// an unset slot unset.
    pub fn coerce(&self, options: &ColumnOptions, value: Option<Value>) -> Option<Value> {
        match options.effective_type() {
            ColumnType::None => value,
            ColumnType::Date => value.map(|v| self.coerce_date(v)),
            ColumnType::Json => value.map(coerce_json),
            ColumnType::Number => Some(coerce_number(value.as_ref())),
            ColumnType::Boolean => Some(Value::Bool(coerce_bool(value.as_ref()))),
        }
    }

    fn coerce_date(&self, value: Value) -> Value {
        match value {
            Value::Timestamp(ts) => match self.midnight(&ts) {
                Some(midnight) => Value::Timestamp(midnight),
                None => {
                    tracing::warn!(
                        timestamp = %ts,
                        "Local midnight does not exist for this day, keeping timestamp"
                    );
                    Value::Timestamp(ts)
                }
            },
            Value::Text(s) if s == ZERO_DATE => Value::Null,
            other => other,
        }
    }

    /// Start of the local calendar day containing `ts`.
    pub fn midnight(&self, ts: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let day = self.basis.local_date(ts);
        self.basis.localize(day.and_hms_opt(0, 0, 0)?)
    }

    /// Turn date-time looking strings into timestamps.
    ///
    /// Strings with an explicit offset keep it; offset-less strings are read
    /// as wall-clock time in this coercer's zone. A string that matches the
    /// pattern but does not parse is returned unchanged.
    pub fn revive(&self, value: Value) -> Value {
        let s = match value {
            Value::Text(s) => s,
            other => return other,
        };
        if !date_pattern().is_some_and(|re| re.is_match(&s)) {
            return Value::Text(s);
        }
        match self.parse_timestamp(s.trim()) {
            Some(ts) => Value::Timestamp(ts),
            None => {
                tracing::warn!(value = %s, "String looks like a timestamp but does not parse");
                Value::Text(s)
            }
        }
    }

    fn parse_timestamp(&self, s: &str) -> Option<DateTime<FixedOffset>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts);
        }
        if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(ts);
        }
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        self.basis.localize(naive)
    }
}

fn coerce_json(value: Value) -> Value {
    match value {
        Value::Text(s) => match serde_json::from_str::<serde_json::Value>(&s) {
            Ok(json) => Value::from_json(json),
            Err(e) => {
                tracing::debug!(error = %e, "Text in json column is not JSON, keeping raw string");
                Value::Text(s)
            }
        },
        other => other,
    }
}

/// Integers, and text that reads as one, keep full `i64` precision; every
/// other value goes through the loose float conversion.
fn coerce_number(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Int(i)) => Value::Int(*i),
        Some(text @ Value::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_or_else(|_| Value::number(text.to_number()), Value::Int),
        other => Value::number(other.map_or(f64::NAN, Value::to_number)),
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        None => false,
        Some(Value::Bytes(bytes)) if bytes.len() == 1 => bytes[0] != 0,
        Some(v) => v.is_truthy(),
    }
}

/// Coerce with the host's local zone.
pub fn coerce(options: &ColumnOptions, value: Option<Value>) -> Option<Value> {
    Coercer::default().coerce(options, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus(hours: i32) -> Coercer {
        Coercer::new(TimeBasis::Fixed(FixedOffset::east_opt(hours * 3600).unwrap()))
    }

    fn typed(column_type: ColumnType) -> ColumnOptions {
        ColumnOptions::new().column_type(column_type)
    }

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_untyped_is_identity() {
        let v = Some(Value::Text(" raw ".to_string()));
        assert_eq!(coerce(&ColumnOptions::new(), v.clone()), v);
        assert_eq!(coerce(&ColumnOptions::new(), None), None);
    }

    #[test]
    fn test_date_normalizes_to_local_midnight() {
        let c = plus(2);
        let out = c.coerce(
            &typed(ColumnType::Date),
            Some(Value::Timestamp(ts("2024-01-01T10:00:00+02:00"))),
        );
        assert_eq!(
            out,
            Some(Value::Timestamp(ts("2024-01-01T00:00:00+02:00")))
        );
    }

    #[test]
    fn test_date_uses_local_calendar_day() {
        // 23:30 UTC is already the next day at +02:00.
        let c = plus(2);
        let out = c.coerce(
            &typed(ColumnType::Date),
            Some(Value::Timestamp(ts("2024-01-01T23:30:00Z"))),
        );
        assert_eq!(
            out,
            Some(Value::Timestamp(ts("2024-01-02T00:00:00+02:00")))
        );
    }

    #[test]
    fn test_date_zero_sentinel_is_null() {
        let out = coerce(&typed(ColumnType::Date), Some(Value::from(ZERO_DATE)));
        assert_eq!(out, Some(Value::Null));
    }

    #[test]
    fn test_date_leaves_other_values() {
        let out = coerce(&typed(ColumnType::Date), Some(Value::from("2024-01-01")));
        assert_eq!(out, Some(Value::from("2024-01-01")));
        assert_eq!(coerce(&typed(ColumnType::Date), None), None);
    }

    #[test]
    fn test_json_parses_text() {
        let out = coerce(&typed(ColumnType::Json), Some(Value::from(r#"{"a":[1,2]}"#)));
        assert_eq!(out, Some(Value::Json(serde_json::json!({"a": [1, 2]}))));

        let scalar = coerce(&typed(ColumnType::Json), Some(Value::from("5")));
        assert_eq!(scalar, Some(Value::Int(5)));
    }

    #[test]
    fn test_number_keeps_large_integers_exact() {
        let opts = typed(ColumnType::Number);
        let big = 9_007_199_254_740_993_i64;
        assert_eq!(coerce(&opts, Some(Value::Int(big))), Some(Value::Int(big)));
        assert_eq!(
            coerce(&opts, Some(Value::from("9007199254740993"))),
            Some(Value::Int(big))
        );
        assert_eq!(coerce(&opts, Some(Value::from(" -42 "))), Some(Value::Int(-42)));
    }

    #[test]
    fn test_json_keeps_invalid_text() {
        let out = coerce(&typed(ColumnType::Json), Some(Value::from("{not json")));
        assert_eq!(out, Some(Value::from("{not json")));
    }

    #[test]
    fn test_number() {
        let opts = typed(ColumnType::Number);
        assert_eq!(coerce(&opts, Some(Value::from("12"))), Some(Value::Int(12)));
        assert_eq!(coerce(&opts, Some(Value::from("1.5"))), Some(Value::Double(1.5)));
        assert_eq!(coerce(&opts, Some(Value::Bool(true))), Some(Value::Int(1)));
        assert!(matches!(
            coerce(&opts, Some(Value::from("twelve"))),
            Some(Value::Double(d)) if d.is_nan()
        ));
        assert!(matches!(coerce(&opts, None), Some(Value::Double(d)) if d.is_nan()));
    }

    #[test]
    fn test_boolean_single_byte_buffer() {
        let opts = typed(ColumnType::Boolean);
        assert_eq!(coerce(&opts, Some(Value::Bytes(vec![0]))), Some(Value::Bool(false)));
        assert_eq!(coerce(&opts, Some(Value::Bytes(vec![1]))), Some(Value::Bool(true)));
        // Longer buffers are plain objects and therefore truthy.
        assert_eq!(coerce(&opts, Some(Value::Bytes(vec![0, 0]))), Some(Value::Bool(true)));
    }

    #[test]
    fn test_boolean_truthiness() {
        let opts = typed(ColumnType::Boolean);
        assert_eq!(coerce(&opts, Some(Value::Int(0))), Some(Value::Bool(false)));
        assert_eq!(coerce(&opts, Some(Value::from("0"))), Some(Value::Bool(true)));
        assert_eq!(coerce(&opts, Some(Value::Null)), Some(Value::Bool(false)));
        assert_eq!(coerce(&opts, None), Some(Value::Bool(false)));
    }

    #[test]
    fn test_revive_offsetless_uses_basis() {
        let c = plus(1);
        assert_eq!(
            c.revive(Value::from("2024-01-01T10:00:00")),
            Value::Timestamp(ts("2024-01-01T10:00:00+01:00"))
        );
    }

    #[test]
    fn test_revive_keeps_explicit_offset() {
        let c = plus(1);
        assert_eq!(
            c.revive(Value::from("2024-01-01T10:00:00.250Z")),
            Value::Timestamp(ts("2024-01-01T10:00:00.250Z"))
        );
        assert_eq!(
            c.revive(Value::from("2024-01-01T10:00:00+0530")),
            Value::Timestamp(ts("2024-01-01T10:00:00+05:30"))
        );
    }

    #[test]
    fn test_revive_ignores_non_matching_and_unparsable() {
        let c = plus(0);
        assert_eq!(c.revive(Value::from("2024-01-01")), Value::from("2024-01-01"));
        assert_eq!(
            c.revive(Value::from("at 2024-01-01T10:00:00")),
            Value::from("at 2024-01-01T10:00:00")
        );
        assert_eq!(c.revive(Value::Int(5)), Value::Int(5));
    }
}
