//! The model binder: raw channels in, bound models or a full report out.
//!
//! Binding walks each field of a model in declaration order: look up the
//! field's wire key in the channel, coerce, validate, store. A field fails
//! at most once (fail-fast within the field), but every field is visited,
//! so the caller receives a complete [`ErrorReport`] covering the whole
//! request, never a partial one.

use crate::bound::{BoundModel, BoundRequest};
use crate::coerce::{coerce, coerce_json, type_tag, RawValue};
use crate::context::{RawBody, RawRequest};
use crate::validate::validate;
use caliper_core::{BindingError, ErrorReport, Source, Value};
use caliper_schema::{ExtraPolicy, FieldSchema, FieldType, ModelSchema, SchemaRegistry};
use std::collections::HashSet;
use tracing::trace;

const OBJECT_EXPECTED: &str = "Input should be a valid dictionary or object to extract fields from";

/// Binds a whole request against every channel of the registry.
///
/// All channels are processed even after one fails, so the report covers
/// every invalid field in the request. On success the per-channel models
/// are merged into a single [`BoundRequest`]; the registry guarantees no
/// two channels share a field name.
///
/// # Errors
///
/// Returns the complete [`ErrorReport`] if any field in any channel failed.
///
/// # Example
///
/// ```rust
/// use caliper_bind::{bind_request, RawRequest};
/// use caliper_core::{Source, Value};
/// use caliper_schema::{FieldSchema, FieldType, RegistryBuilder};
///
/// let mut builder = RegistryBuilder::new();
/// builder
///     .register(FieldSchema::new("item_id", Source::Path, FieldType::Integer).required())
///     .unwrap();
/// builder
///     .register(FieldSchema::new("q", Source::Query, FieldType::Text))
///     .unwrap();
/// let registry = builder.freeze();
///
/// let raw = RawRequest::builder()
///     .path_param("item_id", "42")
///     .query_string("q=test")
///     .build();
///
/// let bound = bind_request(&registry, &raw).unwrap();
/// assert_eq!(bound.get("item_id"), Some(&Value::Int(42)));
/// assert_eq!(bound.get("q"), Some(&Value::Str("test".into())));
/// ```
pub fn bind_request(
    registry: &SchemaRegistry,
    raw: &RawRequest,
) -> Result<BoundRequest, ErrorReport> {
    let mut combined = BoundRequest::default();
    let mut report = ErrorReport::new();

    for source in Source::ALL {
        match bind_model(raw, registry.resolve(source)) {
            Ok(bound) => combined.merge(bound),
            Err(errors) => report.merge(errors),
        }
    }

    trace!(errors = report.len(), "request bound");
    report.into_result(combined)
}

/// Binds one model against its channel of the raw request.
///
/// # Errors
///
/// Returns every per-field failure for this channel.
pub fn bind_model(raw: &RawRequest, schema: &ModelSchema) -> Result<BoundModel, ErrorReport> {
    match schema.source() {
        Source::Path => {
            let pairs: Vec<(&str, &str)> = raw.path_pairs().collect();
            bind_text_pairs(&pairs, schema)
        }
        Source::Query => {
            let pairs: Vec<(&str, &str)> = raw
                .query_pairs()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            bind_text_pairs(&pairs, schema)
        }
        Source::Header => {
            let pairs: Vec<(&str, &str)> = raw
                .header_pairs()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            bind_text_pairs(&pairs, schema)
        }
        Source::Cookie => {
            let pairs: Vec<(&str, &str)> = raw.cookie_pairs().collect();
            bind_text_pairs(&pairs, schema)
        }
        Source::Body => bind_body(raw.body(), schema),
    }
}

/// Binds a model from owned textual key/value pairs.
///
/// The entry point for form-encoded payloads decoded outside the binder;
/// the same matching, coercion and validation rules apply as for query
/// parameters.
///
/// # Errors
///
/// Returns every per-field failure.
pub fn bind_pairs(
    pairs: &[(String, String)],
    schema: &ModelSchema,
) -> Result<BoundModel, ErrorReport> {
    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    bind_text_pairs(&borrowed, schema)
}

fn bind_text_pairs(
    pairs: &[(&str, &str)],
    schema: &ModelSchema,
) -> Result<BoundModel, ErrorReport> {
    let mut bound = BoundModel::with_defaults(schema);
    let mut report = ErrorReport::new();
    let channel = schema.source().as_str();
    let mut claimed: HashSet<String> = HashSet::new();

    for field in schema.fields() {
        let key = normalize_key(field.lookup_key(), schema);
        claimed.insert(key.clone());

        let occurrences: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| normalize_key(k, schema) == key)
            .map(|(_, v)| *v)
            .collect();
        let loc = vec![channel.to_string(), field.lookup_key().to_string()];

        let Some(first) = occurrences.first().copied() else {
            if field.is_required() {
                report.push(BindingError::missing(loc));
            }
            continue;
        };

        // Scalar fields take the first occurrence of a repeated key.
        let raw = if field.is_repeated() {
            RawValue::Many(occurrences)
        } else {
            RawValue::Single(first)
        };
        bind_field(&mut bound, &mut report, field, &raw, &loc);
    }

    if schema.extra() == ExtraPolicy::Forbid {
        let mut reported: HashSet<String> = HashSet::new();
        for (key, _) in pairs {
            let normalized = normalize_key(key, schema);
            if !claimed.contains(&normalized) && reported.insert(normalized) {
                report.push(BindingError::extra_field(
                    vec![channel.to_string(), (*key).to_string()],
                    *key,
                ));
            }
        }
    }

    report.into_result(bound)
}

fn bind_field(
    bound: &mut BoundModel,
    report: &mut ErrorReport,
    field: &FieldSchema,
    raw: &RawValue<'_>,
    loc: &[String],
) {
    match coerce(raw, field.ty()) {
        Ok(value) => match validate(field, value, loc) {
            Ok(value) => bound.set(field.name(), value),
            Err(err) => report.push(err),
        },
        Err(failure) => report.push(BindingError::coercion(
            loc.to_vec(),
            failure.tag(),
            failure.raw(),
            failure.message(),
        )),
    }
}

fn bind_body(body: &RawBody, schema: &ModelSchema) -> Result<BoundModel, ErrorReport> {
    // A body is only inspected when body fields are declared.
    if schema.fields().is_empty() {
        return Ok(BoundModel::with_defaults(schema));
    }
    match body {
        RawBody::Empty => {
            let bound = BoundModel::with_defaults(schema);
            let report: ErrorReport = schema
                .fields()
                .iter()
                .filter(|f| f.is_required())
                .map(|f| {
                    BindingError::missing(vec!["body".to_string(), f.lookup_key().to_string()])
                })
                .collect();
            report.into_result(bound)
        }
        RawBody::Json(serde_json::Value::Object(map)) => {
            bind_json_object(map, schema, &["body".to_string()])
        }
        RawBody::Json(other) => Err(std::iter::once(BindingError::coercion(
            vec!["body".to_string()],
            "model_type",
            other.to_string(),
            OBJECT_EXPECTED,
        ))
        .collect()),
        RawBody::Raw { bytes, content_type } => bind_raw_body(bytes, content_type.as_deref(), schema),
    }
}

fn bind_raw_body(
    bytes: &bytes::Bytes,
    content_type: Option<&str>,
    schema: &ModelSchema,
) -> Result<BoundModel, ErrorReport> {
    if content_type.is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded")) {
        return match serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes) {
            Ok(pairs) => bind_pairs(&pairs, schema),
            Err(_) => Err(std::iter::once(BindingError::coercion(
                vec!["body".to_string()],
                "model_type",
                String::from_utf8_lossy(bytes).into_owned(),
                OBJECT_EXPECTED,
            ))
            .collect()),
        };
    }

    // An undecoded byte body binds whole to a single byte field.
    let mut byte_fields = schema
        .fields()
        .iter()
        .filter(|f| matches!(f.ty(), FieldType::Bytes));
    match (byte_fields.next(), byte_fields.next()) {
        (Some(field), None) => {
            let mut bound = BoundModel::with_defaults(schema);
            let mut report = ErrorReport::new();
            let loc = vec!["body".to_string(), field.lookup_key().to_string()];
            bind_field(&mut bound, &mut report, field, &RawValue::Bytes(bytes), &loc);
            for other in schema.fields() {
                if other.is_required() && !matches!(other.ty(), FieldType::Bytes) {
                    report.push(BindingError::missing(vec![
                        "body".to_string(),
                        other.lookup_key().to_string(),
                    ]));
                }
            }
            report.into_result(bound)
        }
        _ => Err(std::iter::once(BindingError::coercion(
            vec!["body".to_string()],
            "model_type",
            format!("<{} bytes>", bytes.len()),
            OBJECT_EXPECTED,
        ))
        .collect()),
    }
}

/// Binds a model from a decoded JSON object, recursing into nested models
/// with the location prefixed by the outer field path.
pub fn bind_json_object(
    map: &serde_json::Map<String, serde_json::Value>,
    schema: &ModelSchema,
    prefix: &[String],
) -> Result<BoundModel, ErrorReport> {
    let mut bound = BoundModel::with_defaults(schema);
    let mut report = ErrorReport::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for field in schema.fields() {
        let key = field.lookup_key();
        claimed.insert(key);
        let mut loc = prefix.to_vec();
        loc.push(key.to_string());

        match map.get(key) {
            None => {
                if field.is_required() {
                    report.push(BindingError::missing(loc));
                }
            }
            // Explicit null never satisfies a required field.
            Some(json) if json.is_null() && field.is_required() => {
                report.push(BindingError::coercion(
                    loc,
                    type_tag(field.ty()),
                    "null",
                    format!("Input should be a valid {}", field.ty().name()),
                ));
            }
            Some(json) => match coerce_json_field(field, json, &loc) {
                Ok(value) => match validate(field, value, &loc) {
                    Ok(value) => bound.set(field.name(), value),
                    Err(err) => report.push(err),
                },
                Err(errors) => report.merge(errors),
            },
        }
    }

    if schema.extra() == ExtraPolicy::Forbid {
        for key in map.keys() {
            if !claimed.contains(key.as_str()) {
                let mut loc = prefix.to_vec();
                loc.push(key.clone());
                report.push(BindingError::extra_field(loc, key));
            }
        }
    }

    report.into_result(bound)
}

fn coerce_json_field(
    field: &FieldSchema,
    json: &serde_json::Value,
    loc: &[String],
) -> Result<Value, ErrorReport> {
    match (field.ty(), json) {
        (FieldType::Nested(inner), serde_json::Value::Object(obj)) => {
            let nested = bind_json_object(obj, inner, loc)?;
            Ok(Value::Map(nested.values().clone()))
        }
        (FieldType::Nested(_), serde_json::Value::Null) => Ok(Value::Null),
        (FieldType::Nested(_), other) => Err(std::iter::once(BindingError::coercion(
            loc.to_vec(),
            "model_type",
            other.to_string(),
            OBJECT_EXPECTED,
        ))
        .collect()),
        _ => coerce_json(json, field.ty()).map_err(|failure| {
            std::iter::once(BindingError::coercion(
                loc.to_vec(),
                failure.tag(),
                failure.raw(),
                failure.message(),
            ))
            .collect()
        }),
    }
}

/// The wire key a field matches against, after channel normalization.
///
/// Header matching is case-insensitive and (unless disabled on the model)
/// maps underscores to dashes, so a field named `user_agent` matches the
/// `User-Agent` header. Other channels match exactly.
fn normalize_key(key: &str, schema: &ModelSchema) -> String {
    if schema.source() == Source::Header {
        let lower = key.to_ascii_lowercase();
        if schema.normalizes_names() {
            lower.replace('_', "-")
        } else {
            lower
        }
    } else {
        key.to_string()
    }
}
