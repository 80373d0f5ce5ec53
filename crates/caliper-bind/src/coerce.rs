//! Raw-value coercion.
//!
//! Coercion converts one raw wire representation into a typed [`Value`]
//! according to a fixed per-type rule table. It never applies constraints:
//! it either establishes the typed value or fails fast with a single
//! [`CoercionFailure`] carrying the offending raw value and a taxonomy tag.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use caliper_core::Value;
use caliper_schema::FieldType;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// One raw representation handed to the coercion engine.
#[derive(Debug, Clone)]
pub enum RawValue<'a> {
    /// A single textual value (path segment, query value, header, cookie).
    Single(&'a str),
    /// Every textual occurrence of a repeated key, in arrival order.
    Many(Vec<&'a str>),
    /// Raw bytes from a body channel; passed through for byte fields.
    Bytes(&'a Bytes),
}

impl RawValue<'_> {
    fn display(&self) -> String {
        match self {
            Self::Single(s) => (*s).to_string(),
            Self::Many(items) => items.join(","),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// A failed coercion: the taxonomy tag, the raw input and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    tag: &'static str,
    raw: String,
    msg: String,
}

impl CoercionFailure {
    fn new(tag: &'static str, raw: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            tag,
            raw: raw.into(),
            msg: msg.into(),
        }
    }

    /// The taxonomy tag (e.g. `int_parsing`).
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The offending raw value.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

/// Coerces one raw representation into the target type.
///
/// A [`RawValue::Many`] against a non-sequence type coerces its first
/// occurrence; a [`RawValue::Bytes`] is only accepted by byte fields.
///
/// # Example
///
/// ```rust
/// use caliper_bind::{coerce, RawValue};
/// use caliper_schema::FieldType;
/// use caliper_core::Value;
///
/// let v = coerce(&RawValue::Single("42"), &FieldType::Integer).unwrap();
/// assert_eq!(v, Value::Int(42));
///
/// let err = coerce(&RawValue::Single("abc"), &FieldType::Integer).unwrap_err();
/// assert_eq!(err.tag(), "int_parsing");
/// assert_eq!(err.raw(), "abc");
/// ```
pub fn coerce(raw: &RawValue<'_>, ty: &FieldType) -> Result<Value, CoercionFailure> {
    match (raw, ty) {
        (RawValue::Many(items), FieldType::TextSeq) => Ok(Value::Seq(
            items.iter().map(|s| Value::Str((*s).to_string())).collect(),
        )),
        // The binder never constructs an empty occurrence list; an empty
        // one coerces like the empty string.
        (RawValue::Many(items), _) => coerce_text(items.first().copied().unwrap_or_default(), ty),
        (RawValue::Bytes(bytes), FieldType::Bytes) => Ok(Value::Bytes((*bytes).clone())),
        (RawValue::Bytes(_), _) => Err(CoercionFailure::new(
            parsing_tag(ty),
            raw.display(),
            format!("Input should be a valid {}", ty.name()),
        )),
        (RawValue::Single(s), _) => coerce_text(s, ty),
    }
}

/// Coerces one textual value into the target type.
pub fn coerce_text(s: &str, ty: &FieldType) -> Result<Value, CoercionFailure> {
    match ty {
        FieldType::Text => Ok(Value::Str(s.to_string())),
        FieldType::TextSeq => Ok(Value::Seq(vec![Value::Str(s.to_string())])),
        FieldType::Integer => s.parse::<i64>().map(Value::Int).map_err(|_| {
            CoercionFailure::new(
                "int_parsing",
                s,
                "Input should be a valid integer, unable to parse string as an integer",
            )
        }),
        FieldType::Float => s.parse::<f64>().map(Value::Float).map_err(|_| {
            CoercionFailure::new(
                "float_parsing",
                s,
                "Input should be a valid number, unable to parse string as a number",
            )
        }),
        FieldType::Decimal => Decimal::from_str(s).map(Value::Decimal).map_err(|_| {
            CoercionFailure::new(
                "decimal_parsing",
                s,
                "Input should be a valid decimal",
            )
        }),
        FieldType::Boolean => parse_bool(s).map(Value::Bool).ok_or_else(|| {
            CoercionFailure::new(
                "bool_parsing",
                s,
                "Input should be a valid boolean, unable to interpret input",
            )
        }),
        FieldType::Uuid => uuid::Uuid::parse_str(s).map(Value::Uuid).map_err(|_| {
            CoercionFailure::new("uuid_parsing", s, "Input should be a valid UUID")
        }),
        FieldType::Date => NaiveDate::from_str(s).map(Value::Date).map_err(|_| {
            CoercionFailure::new("date_parsing", s, "Input should be a valid date")
        }),
        FieldType::Time => parse_time(s).map(Value::Time).ok_or_else(|| {
            CoercionFailure::new("time_parsing", s, "Input should be a valid time")
        }),
        FieldType::DateTime => parse_datetime(s).map(Value::DateTime).ok_or_else(|| {
            CoercionFailure::new("datetime_parsing", s, "Input should be a valid datetime")
        }),
        FieldType::Duration => parse_duration(s).map(Value::Duration).ok_or_else(|| {
            CoercionFailure::new("duration_parsing", s, "Input should be a valid duration")
        }),
        FieldType::Bytes => BASE64
            .decode(s)
            .map(|b| Value::Bytes(Bytes::from(b)))
            .map_err(|_| {
                CoercionFailure::new(
                    "base64_decode",
                    s,
                    "Input should be valid base64-encoded bytes",
                )
            }),
        FieldType::Nested(_) => Err(CoercionFailure::new(
            "model_type",
            s,
            "Input should be an object",
        )),
    }
}

/// Coerces one JSON tree leaf into the target type.
///
/// JSON numbers map to integers, floats and decimals; JSON strings go
/// through the textual rule table; explicit JSON `null` coerces to the
/// none-marker for any target type.
pub fn coerce_json(v: &serde_json::Value, ty: &FieldType) -> Result<Value, CoercionFailure> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::String(s) => coerce_text(s, ty),
        serde_json::Value::Bool(b) => match ty {
            FieldType::Boolean => Ok(Value::Bool(*b)),
            _ => Err(type_mismatch(v, ty)),
        },
        serde_json::Value::Number(n) => match ty {
            FieldType::Integer => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| type_mismatch(v, ty)),
            FieldType::Float => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| type_mismatch(v, ty)),
            FieldType::Decimal => Decimal::from_str(&n.to_string())
                .map(Value::Decimal)
                .map_err(|_| type_mismatch(v, ty)),
            // Bare numbers for durations are seconds.
            FieldType::Duration => n
                .as_f64()
                .map(|secs| Value::Duration(Duration::microseconds((secs * 1e6).round() as i64)))
                .ok_or_else(|| type_mismatch(v, ty)),
            _ => Err(type_mismatch(v, ty)),
        },
        serde_json::Value::Array(items) => match ty {
            FieldType::TextSeq => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(s) => out.push(Value::Str(s.clone())),
                        other => return Err(type_mismatch(other, &FieldType::Text)),
                    }
                }
                Ok(Value::Seq(out))
            }
            _ => Err(type_mismatch(v, ty)),
        },
        serde_json::Value::Object(_) => Err(CoercionFailure::new(
            type_tag(ty),
            v.to_string(),
            format!("Input should be a valid {}", ty.name()),
        )),
    }
}

/// Per-spec boolean table, case-insensitive.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::from_str(s)
        .ok()
        .or_else(|| NaiveTime::parse_from_str(s, "%H:%M").ok())
}

fn parse_datetime(s: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        // Naive datetimes (no offset) are taken as UTC.
        NaiveDateTime::from_str(s)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// Parses an ISO-8601 duration (`PnW`, `PnDTnHnMnS`, optional leading sign,
/// fractional seconds). Year and month components are calendar-ambiguous
/// and rejected.
fn parse_duration(input: &str) -> Option<Duration> {
    let (negative, rest) = input
        .strip_prefix('-')
        .map_or((false, input), |r| (true, r));
    let rest = rest.strip_prefix(['P', 'p'])?;
    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.map_or(true, str::is_empty) {
        return None;
    }

    let mut total = Duration::zero();
    let mut digits = String::new();
    for ch in date_part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            let n: i64 = digits.parse().ok()?;
            digits.clear();
            let component = match ch.to_ascii_uppercase() {
                'W' => Duration::try_weeks(n)?,
                'D' => Duration::try_days(n)?,
                _ => return None,
            };
            total = total.checked_add(&component)?;
        }
    }
    if !digits.is_empty() {
        return None;
    }

    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        let mut digits = String::new();
        for ch in time_part.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                digits.push(ch);
            } else {
                let component = match ch.to_ascii_uppercase() {
                    'H' => Duration::try_hours(digits.parse().ok()?)?,
                    'M' => Duration::try_minutes(digits.parse().ok()?)?,
                    'S' => {
                        let secs: f64 = digits.parse().ok()?;
                        Duration::microseconds((secs * 1e6).round() as i64)
                    }
                    _ => return None,
                };
                digits.clear();
                total = total.checked_add(&component)?;
            }
        }
        if !digits.is_empty() {
            return None;
        }
    }

    Some(if negative { -total } else { total })
}

fn type_mismatch(v: &serde_json::Value, ty: &FieldType) -> CoercionFailure {
    CoercionFailure::new(
        type_tag(ty),
        v.to_string(),
        format!("Input should be a valid {}", ty.name()),
    )
}

fn parsing_tag(ty: &FieldType) -> &'static str {
    match ty {
        FieldType::Integer => "int_parsing",
        FieldType::Float => "float_parsing",
        FieldType::Boolean => "bool_parsing",
        FieldType::Text | FieldType::TextSeq => "string_type",
        FieldType::Uuid => "uuid_parsing",
        FieldType::Date => "date_parsing",
        FieldType::Time => "time_parsing",
        FieldType::DateTime => "datetime_parsing",
        FieldType::Duration => "duration_parsing",
        FieldType::Bytes => "base64_decode",
        FieldType::Decimal => "decimal_parsing",
        FieldType::Nested(_) => "model_type",
    }
}

pub(crate) fn type_tag(ty: &FieldType) -> &'static str {
    match ty {
        FieldType::Integer => "int_type",
        FieldType::Float => "float_type",
        FieldType::Boolean => "bool_type",
        FieldType::Text => "string_type",
        FieldType::TextSeq => "list_type",
        FieldType::Uuid => "uuid_type",
        FieldType::Date => "date_type",
        FieldType::Time => "time_type",
        FieldType::DateTime => "datetime_type",
        FieldType::Duration => "duration_type",
        FieldType::Bytes => "bytes_type",
        FieldType::Decimal => "decimal_type",
        FieldType::Nested(_) => "model_type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn single(s: &str) -> RawValue<'_> {
        RawValue::Single(s)
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce(&single("42"), &FieldType::Integer), Ok(Value::Int(42)));
        assert_eq!(coerce(&single("-7"), &FieldType::Integer), Ok(Value::Int(-7)));
        let err = coerce(&single("4.2"), &FieldType::Integer).unwrap_err();
        assert_eq!(err.tag(), "int_parsing");
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(
            coerce(&single("23.5"), &FieldType::Float),
            Ok(Value::Float(23.5))
        );
        assert_eq!(
            coerce(&single("abc"), &FieldType::Float).unwrap_err().tag(),
            "float_parsing"
        );
    }

    #[test]
    fn test_decimal_keeps_precision() {
        let v = coerce(&single("0.300000000000000004"), &FieldType::Decimal).unwrap();
        assert_eq!(v.to_json(), serde_json::json!("0.300000000000000004"));
    }

    #[test]
    fn test_boolean_table() {
        for raw in ["true", "TRUE", "1", "on", "On", "yes", "YES"] {
            assert_eq!(
                coerce(&single(raw), &FieldType::Boolean),
                Ok(Value::Bool(true)),
                "raw = {raw}"
            );
        }
        for raw in ["false", "False", "0", "off", "OFF", "no", "No"] {
            assert_eq!(
                coerce(&single(raw), &FieldType::Boolean),
                Ok(Value::Bool(false)),
                "raw = {raw}"
            );
        }
        assert_eq!(
            coerce(&single("2"), &FieldType::Boolean).unwrap_err().tag(),
            "bool_parsing"
        );
    }

    #[test]
    fn test_string_identity() {
        assert_eq!(
            coerce(&single("  spaces kept  "), &FieldType::Text),
            Ok(Value::Str("  spaces kept  ".to_string()))
        );
    }

    #[test]
    fn test_sequence_preserves_arrival_order() {
        let raw = RawValue::Many(vec!["a", "b", "c"]);
        assert_eq!(
            coerce(&raw, &FieldType::TextSeq),
            Ok(Value::text_seq(["a", "b", "c"]))
        );
    }

    #[test]
    fn test_uuid_coercion() {
        let v = coerce(
            &single("c892b7f1-dfd2-4d2a-8a10-98ce3e9fbde9"),
            &FieldType::Uuid,
        )
        .unwrap();
        assert_eq!(
            v.to_json(),
            serde_json::json!("c892b7f1-dfd2-4d2a-8a10-98ce3e9fbde9")
        );
        assert_eq!(
            coerce(&single("not-a-uuid"), &FieldType::Uuid).unwrap_err().tag(),
            "uuid_parsing"
        );
    }

    #[test]
    fn test_date_time_datetime() {
        assert!(coerce(&single("2023-01-01"), &FieldType::Date).is_ok());
        assert_eq!(
            coerce(&single("01/01/2023"), &FieldType::Date).unwrap_err().tag(),
            "date_parsing"
        );

        assert!(coerce(&single("12:30:00"), &FieldType::Time).is_ok());
        assert!(coerce(&single("12:30"), &FieldType::Time).is_ok());

        assert!(coerce(&single("2023-01-01T12:00:00"), &FieldType::DateTime).is_ok());
        assert!(coerce(&single("2023-01-01T12:00:00+02:00"), &FieldType::DateTime).is_ok());
        assert_eq!(
            coerce(&single("noon"), &FieldType::DateTime).unwrap_err().tag(),
            "datetime_parsing"
        );
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(
            coerce(&single("P2DT3H4M"), &FieldType::Duration),
            Ok(Value::Duration(
                Duration::days(2) + Duration::hours(3) + Duration::minutes(4)
            ))
        );
        assert_eq!(
            coerce(&single("PT1.5S"), &FieldType::Duration),
            Ok(Value::Duration(Duration::milliseconds(1500)))
        );
        assert_eq!(
            coerce(&single("-PT30M"), &FieldType::Duration),
            Ok(Value::Duration(-Duration::minutes(30)))
        );
        assert_eq!(
            coerce(&single("P1W"), &FieldType::Duration),
            Ok(Value::Duration(Duration::weeks(1)))
        );
        for bad in ["", "P", "PT", "P1Y", "3 days", "PT5X"] {
            assert!(
                coerce(&single(bad), &FieldType::Duration).is_err(),
                "raw = {bad}"
            );
        }
    }

    #[test]
    fn test_bytes_from_text_channel_is_base64() {
        assert_eq!(
            coerce(&single("aGVsbG8="), &FieldType::Bytes),
            Ok(Value::Bytes(Bytes::from_static(b"hello")))
        );
        assert_eq!(
            coerce(&single("not base64!!"), &FieldType::Bytes)
                .unwrap_err()
                .tag(),
            "base64_decode"
        );
    }

    #[test]
    fn test_bytes_from_body_pass_through() {
        let body = Bytes::from_static(b"\x00\x01binary");
        assert_eq!(
            coerce(&RawValue::Bytes(&body), &FieldType::Bytes),
            Ok(Value::Bytes(body.clone()))
        );
        assert!(coerce(&RawValue::Bytes(&body), &FieldType::Integer).is_err());
    }

    #[test]
    fn test_empty_occurrence_list_is_a_parse_error() {
        let raw = RawValue::Many(vec![]);
        assert_eq!(
            coerce(&raw, &FieldType::Integer).unwrap_err().tag(),
            "int_parsing"
        );
        assert_eq!(coerce(&raw, &FieldType::TextSeq), Ok(Value::Seq(vec![])));
    }

    #[test]
    fn test_json_numbers() {
        assert_eq!(
            coerce_json(&serde_json::json!(23.5), &FieldType::Float),
            Ok(Value::Float(23.5))
        );
        assert_eq!(
            coerce_json(&serde_json::json!(5), &FieldType::Integer),
            Ok(Value::Int(5))
        );
        assert_eq!(
            coerce_json(&serde_json::json!(5.5), &FieldType::Integer)
                .unwrap_err()
                .tag(),
            "int_type"
        );
    }

    #[test]
    fn test_json_strings_use_text_rules() {
        assert_eq!(
            coerce_json(&serde_json::json!("2023-01-01"), &FieldType::Date)
                .unwrap()
                .type_name(),
            "date"
        );
        assert_eq!(
            coerce_json(&serde_json::json!("7"), &FieldType::Integer),
            Ok(Value::Int(7))
        );
    }

    #[test]
    fn test_json_null_is_none_marker() {
        assert_eq!(
            coerce_json(&serde_json::Value::Null, &FieldType::Text),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_json_array_of_strings() {
        assert_eq!(
            coerce_json(&serde_json::json!(["a", "b"]), &FieldType::TextSeq),
            Ok(Value::text_seq(["a", "b"]))
        );
        assert!(coerce_json(&serde_json::json!([1]), &FieldType::TextSeq).is_err());
    }

    #[test]
    fn test_json_duration_seconds() {
        assert_eq!(
            coerce_json(&serde_json::json!(90), &FieldType::Duration),
            Ok(Value::Duration(Duration::seconds(90)))
        );
    }

    proptest! {
        #[test]
        fn prop_bool_table_is_total_over_case(raw in "(true|false|yes|no|on|off|1|0)") {
            // Any casing of a table entry must coerce, and to the same value
            // as the lowercase form.
            let upper = raw.to_ascii_uppercase();
            prop_assert_eq!(parse_bool(&upper), parse_bool(&raw));
            prop_assert!(parse_bool(&raw).is_some());
        }

        #[test]
        fn prop_integers_round_trip(n in any::<i64>()) {
            let coerced = coerce_text(&n.to_string(), &FieldType::Integer).unwrap();
            prop_assert_eq!(coerced, Value::Int(n));
        }
    }
}
