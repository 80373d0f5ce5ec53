//! Typed value model shared by every pipeline stage.
//!
//! A [`Value`] is the result of coercing a raw wire representation, the
//! payload carried by a bound model, and the unit of response projection.
//! Serialization always goes through the JSON mapping described on
//! [`Value::to_json`], so a value renders identically in error reports,
//! projected responses and logs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A typed value produced by coercion or supplied by business logic.
///
/// `Null` doubles as the none-marker: an optional field with no raw value
/// and a `None`-style default binds to `Value::Null`.
///
/// # Example
///
/// ```rust
/// use caliper_core::Value;
///
/// let v = Value::Int(42);
/// assert_eq!(v.as_i64(), Some(42));
/// assert!(!v.is_null());
/// assert_eq!(v.to_json(), serde_json::json!(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The empty/none marker.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A high-precision decimal (parsed like a float, kept exact).
    Decimal(Decimal),
    /// A UTF-8 string.
    Str(String),
    /// A UUID in canonical 128-bit textual form.
    Uuid(Uuid),
    /// An ISO-8601 calendar date.
    Date(NaiveDate),
    /// An ISO-8601 time of day.
    Time(NaiveTime),
    /// An ISO-8601 datetime with offset (naive input is taken as UTC).
    DateTime(DateTime<FixedOffset>),
    /// A signed duration, serialized in ISO-8601 duration encoding.
    Duration(Duration),
    /// A raw byte payload, serialized as base64.
    Bytes(Bytes),
    /// An ordered sequence of values.
    Seq(Vec<Value>),
    /// An ordered string-keyed mapping (preserves insertion order).
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns `true` if this value is the none-marker.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice for `Str` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer for `Int` values.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean for `Bool` values.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a numeric view of `Int`, `Float` and `Decimal` values.
    ///
    /// Used by bound constraints, which compare in `f64` space.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Decimal(d) => Some(d.to_f64().unwrap_or(f64::NAN)),
            _ => None,
        }
    }

    /// Returns the sequence elements for `Seq` values.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mapping for `Map` values.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Builds a `Seq` of `Str` values, preserving iteration order.
    ///
    /// Convenient for declaring static default sequences on a schema.
    pub fn text_seq<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Seq(items.into_iter().map(|s| Self::Str(s.into())).collect())
    }

    /// Short name of the value's type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Str(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Duration(_) => "duration",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    /// Converts to the JSON representation used on the wire.
    ///
    /// Dates, times and datetimes render as ISO-8601 strings, durations in
    /// ISO-8601 duration encoding, bytes as base64, decimals as exact
    /// strings. A non-finite float renders as JSON `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Decimal(d) => serde_json::Value::String(d.to_string()),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Uuid(u) => serde_json::Value::String(u.to_string()),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Time(t) => serde_json::Value::String(t.format("%H:%M:%S%.f").to_string()),
            Self::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Self::Duration(d) => serde_json::Value::String(format_duration(*d)),
            Self::Bytes(b) => serde_json::Value::String(BASE64.encode(b)),
            Self::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Seq(items)
    }
}

/// Formats a duration in ISO-8601 duration encoding (`PnDTnHnMnS`).
///
/// Sub-second precision is rendered as a fractional seconds component.
/// The zero duration renders as `PT0S`.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let negative = d < Duration::zero();
    let d = if negative { -d } else { d };

    let days = d.num_days();
    let hours = d.num_hours() - days * 24;
    let minutes = d.num_minutes() - d.num_hours() * 60;
    let seconds = d.num_seconds() - d.num_minutes() * 60;
    let micros = d.num_microseconds().unwrap_or(0) - d.num_seconds() * 1_000_000;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days != 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours != 0 || minutes != 0 || seconds != 0 || micros != 0 || days == 0 {
        out.push('T');
        if hours != 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes != 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if micros != 0 {
            let frac = format!("{micros:06}");
            out.push_str(&format!("{seconds}.{}S", frac.trim_end_matches('0')));
        } else if seconds != 0 || (hours == 0 && minutes == 0) {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_null_is_none_marker() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(0).is_null());
        assert_eq!(Value::Null.to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Value::Str("hi".into()).as_str(), Some("hi"));
        assert_eq!(Value::Int(7).as_i64(), Some(7));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_str(), None);
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        let d = Decimal::from_str("23.5").unwrap();
        assert_eq!(Value::Decimal(d).as_f64(), Some(23.5));
        assert_eq!(Value::Str("2".into()).as_f64(), None);
    }

    #[test]
    fn test_text_seq_builder() {
        let v = Value::text_seq(["a", "b", "c"]);
        assert_eq!(v.to_json(), serde_json::json!(["a", "b", "c"]));
    }

    #[test]
    fn test_date_time_json_forms() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(Value::Date(date).to_json(), serde_json::json!("2023-01-01"));

        let time = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
        assert_eq!(Value::Time(time).to_json(), serde_json::json!("12:30:00"));
    }

    #[test]
    fn test_decimal_json_is_exact_string() {
        let d = Decimal::from_str("0.300000000000000004").unwrap();
        assert_eq!(
            Value::Decimal(d).to_json(),
            serde_json::json!("0.300000000000000004")
        );
    }

    #[test]
    fn test_bytes_json_is_base64() {
        let v = Value::Bytes(Bytes::from_static(b"hello"));
        assert_eq!(v.to_json(), serde_json::json!("aGVsbG8="));
    }

    #[test]
    fn test_map_preserves_order() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), Value::Int(1));
        map.insert("a".to_string(), Value::Int(2));
        let json = Value::Map(map).to_json();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_format_duration_zero() {
        assert_eq!(format_duration(Duration::zero()), "PT0S");
    }

    #[test]
    fn test_format_duration_mixed() {
        let d = Duration::days(2) + Duration::hours(3) + Duration::minutes(4);
        assert_eq!(format_duration(d), "P2DT3H4M");
    }

    #[test]
    fn test_format_duration_fractional_seconds() {
        let d = Duration::seconds(1) + Duration::milliseconds(500);
        assert_eq!(format_duration(d), "PT1.5S");
    }

    #[test]
    fn test_format_duration_negative() {
        assert_eq!(format_duration(-Duration::minutes(90)), "-PT1H30M");
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let v = Value::Seq(vec![Value::Int(1), Value::Str("two".into())]);
        let via_serde = serde_json::to_value(&v).unwrap();
        assert_eq!(via_serde, v.to_json());
    }
}
